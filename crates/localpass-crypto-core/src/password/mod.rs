//! Random password generation.
//!
//! [`generate_password`] draws every character from `OsRng`. Each enabled
//! charset contributes at least one character, and the result is shuffled
//! so those guaranteed characters do not sit at fixed positions.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum allowed password length.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Maximum allowed password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Default password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
/// Symbol alphabet offered by the generator.
pub const SYMBOLS: &[u8] = b"!@#$%^&*()_+~`|}{[]:;?><,./-=";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which character classes a generated password may contain.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharsetConfig {
    /// A-Z
    pub uppercase: bool,
    /// a-z
    pub lowercase: bool,
    /// 0-9
    pub digits: bool,
    /// See [`SYMBOLS`].
    pub symbols: bool,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl CharsetConfig {
    /// `true` if at least one class is switched on.
    #[must_use]
    pub const fn any_enabled(&self) -> bool {
        self.uppercase || self.lowercase || self.digits || self.symbols
    }

    fn enabled(&self) -> impl Iterator<Item = &'static [u8]> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(on, set)| on.then_some(set))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate a random password of `length` characters.
///
/// # Errors
///
/// Returns [`CryptoError::PasswordGeneration`] if:
/// - `length` is outside [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`]
/// - No charset is enabled
pub fn generate_password(length: usize, charsets: &CharsetConfig) -> Result<String, CryptoError> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(CryptoError::PasswordGeneration(format!(
            "length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {length}"
        )));
    }
    if !charsets.any_enabled() {
        return Err(CryptoError::PasswordGeneration(
            "at least one charset must be enabled".to_string(),
        ));
    }

    let mut rng = OsRng;
    let mut pool: Vec<u8> = Vec::new();
    let mut chars: Vec<u8> = Vec::with_capacity(length);

    for set in charsets.enabled() {
        pool.extend_from_slice(set);
        chars.push(set[rng.gen_range(0..set.len())]);
    }

    // At most four mandatory characters, and length >= 4.
    while chars.len() < length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    Ok(chars.into_iter().map(char::from).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
