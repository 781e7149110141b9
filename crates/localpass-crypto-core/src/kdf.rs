//! PBKDF2-HMAC-SHA256 key derivation with fixed parameter tiers.
//!
//! This module provides:
//! - [`derive`]: stretch a password + salt into key material
//! - [`Pbkdf2Params`]: iteration count + output length
//! - [`CREDENTIAL_PARAMS`] / [`BACKUP_PARAMS`]: the two tiers in use
//!
//! # Tiers
//!
//! - **Credential hashing** runs on every login, so it uses the lighter tier
//!   (1 000 iterations, 512-bit output).
//! - **Backup keys** are derived once per export/import, so they use ten
//!   times the iterations (10 000 iterations, 256-bit AES key).

use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Minimum salt length in bytes.
const MIN_SALT_LEN: usize = 16;

/// Largest output we ever ask for (512 bits).
const MAX_OUTPUT_LEN: usize = 64;

/// Iteration count for account password hashing.
pub const CREDENTIAL_ITERATIONS: u32 = 1_000;

/// Iteration count for backup key derivation.
pub const BACKUP_ITERATIONS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PBKDF2 parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    /// Number of HMAC-SHA256 iterations.
    pub iterations: u32,
    /// Output length in bytes.
    pub output_len: usize,
}

/// Parameters for account password hashes (512-bit output).
pub const CREDENTIAL_PARAMS: Pbkdf2Params = Pbkdf2Params {
    iterations: CREDENTIAL_ITERATIONS,
    output_len: 64,
};

/// Parameters for backup encryption keys (256-bit output).
pub const BACKUP_PARAMS: Pbkdf2Params = Pbkdf2Params {
    iterations: BACKUP_ITERATIONS,
    output_len: 32,
};

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive `params.output_len` bytes from a password and salt using
/// PBKDF2-HMAC-SHA256.
///
/// The output is written straight into the heap allocation the returned
/// [`SecretBuffer`] takes over, so no unlocked copy is left behind.
///
/// # Password Validation
///
/// Any password is accepted, including empty. Strength rules belong to the
/// caller.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if:
/// - The salt is shorter than 16 bytes
/// - The iteration count is zero
/// - The output length is zero or larger than 64 bytes
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &Pbkdf2Params,
) -> Result<SecretBuffer, CryptoError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt too short: {} bytes (minimum {MIN_SALT_LEN})",
            salt.len()
        )));
    }
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be at least 1".into(),
        ));
    }
    if params.output_len == 0 || params.output_len > MAX_OUTPUT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "invalid output length: {} bytes (expected 1..={MAX_OUTPUT_LEN})",
            params.output_len
        )));
    }

    let mut output = vec![0u8; params.output_len];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, params.iterations, &mut output);

    SecretBuffer::from_vec(output)
        .map_err(|e| CryptoError::KeyDerivation(format!("secure buffer allocation failed: {e}")))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
