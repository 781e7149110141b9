//! Account password hashing and recovery-answer comparison.
//!
//! Master passwords are stored one-way as PBKDF2-HMAC-SHA256 (1 000
//! iterations, 512-bit output) next to a random 128-bit salt. The salt is
//! persisted as 32 lowercase hex characters, and those hex characters (not
//! the decoded bytes) are what the KDF sees, so existing stores keep
//! verifying.
//!
//! Security-question answers must be readable again for comparison, so they
//! go through the [`CipherEnvelope`] rather than the hasher.

use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::envelope::{CipherEnvelope, DecryptOutcome, EncryptedField};
use crate::error::CryptoError;
use crate::kdf::{self, CREDENTIAL_PARAMS};
use crate::memory::SecretBytes;

/// Random salt length before hex encoding.
pub const SALT_LEN: usize = 16;

/// Hash output length in bytes (hex string is twice this).
pub const HASH_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Persisted password hash and its salt, both lowercase hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// 128 hex chars.
    pub password_hash: String,
    /// 32 hex chars.
    pub password_salt: String,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Hash a master password under a fresh random salt.
///
/// # Errors
///
/// Returns `CryptoError::SecureMemory` if the CSPRNG fails, or
/// `CryptoError::KeyDerivation` if PBKDF2 rejects its inputs.
pub fn hash_password(password: &str) -> Result<CredentialRecord, CryptoError> {
    let salt = SecretBytes::<SALT_LEN>::random()?;
    let password_salt = HEXLOWER.encode(salt.expose());
    let password_hash = hash_with_salt(password, &password_salt)?;
    Ok(CredentialRecord {
        password_hash,
        password_salt,
    })
}

/// Recompute the hex hash of `password` under an existing hex salt.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt string is shorter than
/// 16 bytes.
pub fn hash_with_salt(password: &str, salt: &str) -> Result<String, CryptoError> {
    let derived = kdf::derive(password.as_bytes(), salt.as_bytes(), &CREDENTIAL_PARAMS)?;
    Ok(HEXLOWER.encode(derived.expose()))
}

/// Check `password` against a stored salt and hash.
///
/// Deterministic, and the final comparison runs in constant time. Any
/// derivation error (e.g. a truncated salt column) counts as a mismatch.
#[must_use]
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let Ok(computed) = hash_with_salt(password, salt) else {
        tracing::debug!("credential salt rejected by KDF");
        return false;
    };
    let computed = Zeroizing::new(computed);
    constant_time_eq(
        computed.as_bytes(),
        expected_hash.to_ascii_lowercase().as_bytes(),
    )
}

/// Constant-time byte comparison.
///
/// Length mismatch returns early; lengths are not secret here.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ---------------------------------------------------------------------------
// Security answers
// ---------------------------------------------------------------------------

/// Normalize an answer for comparison: trim, then lower-case.
#[must_use]
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Compare a supplied answer against an enveloped stored answer.
///
/// Both sides are normalized with [`normalize_answer`]. A stored answer that
/// is absent, undecryptable or empty never matches, so a corrupted column
/// cannot be satisfied with a blank reply.
#[must_use]
pub fn answers_match(
    envelope: &CipherEnvelope,
    stored: Option<&EncryptedField>,
    supplied: &str,
) -> bool {
    let stored = match envelope.decrypt_outcome(stored) {
        DecryptOutcome::Plaintext(s) => Zeroizing::new(normalize_answer(&s)),
        DecryptOutcome::Absent => return false,
        DecryptOutcome::Failed(why) => {
            tracing::warn!(reason = why.as_str(), "stored security answer unreadable");
            return false;
        }
    };
    if stored.is_empty() {
        return false;
    }
    let supplied = Zeroizing::new(normalize_answer(supplied));
    constant_time_eq(stored.as_bytes(), supplied.as_bytes())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
