//! Per-field AES-CBC envelope under the process-wide static key.
//!
//! This module provides:
//! - [`EnvelopeKey`]: validated static key material (16, 24 or 32 bytes)
//! - [`CipherEnvelope`]: encrypt/decrypt one string field
//! - [`EncryptedField`]: the `{iv, content}` pair persisted per secret
//! - [`DecryptOutcome`]: tagged decrypt result that keeps "never set" and
//!   "could not decrypt" apart
//!
//! # Storage shape
//!
//! `iv` is 16 random bytes as lowercase hex, `content` is the padded
//! ciphertext in standard Base64. Every secret column pair in the store is
//! `<name>_iv` / `<name>_content`.
//!
//! # Failure policy
//!
//! [`CipherEnvelope::decrypt`] never fails: an absent, blank or undecryptable
//! field comes back as `""`. Callers that must tell those cases apart use
//! [`CipherEnvelope::decrypt_outcome`].

use std::fmt;

use data_encoding::{BASE64, HEXLOWER, HEXLOWER_PERMISSIVE};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::aes_cbc::{AesKey, IV_LEN};
use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// The static field-encryption key, validated at construction.
///
/// A wrong-length key is rejected here rather than surfacing later as every
/// decrypt silently returning `""`.
pub struct EnvelopeKey {
    key: AesKey,
}

impl EnvelopeKey {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` unless `bytes` is exactly
    /// 16, 24 or 32 bytes.
    pub fn new(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            key: AesKey::from_slice(bytes)?,
        })
    }

    /// Use the UTF-8 bytes of a configured key string as key material.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyMaterial` unless the string is
    /// exactly 16, 24 or 32 bytes long once encoded.
    pub fn from_passphrase(key: &str) -> Result<Self, CryptoError> {
        Self::new(key.as_bytes())
    }

    /// Key length in bytes (16, 24 or 32).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.key.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvelopeKey<{}>(***)", self.len())
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One encrypted value as stored: hex IV + Base64 ciphertext.
///
/// Missing members deserialize as empty strings, which decrypt to `""`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    /// 16-byte IV, lowercase hex.
    #[serde(default)]
    pub iv: String,
    /// Padded ciphertext, standard Base64.
    #[serde(default)]
    pub content: String,
}

impl EncryptedField {
    /// Rebuild a field from its two nullable storage columns.
    #[must_use]
    pub fn from_columns(iv: Option<String>, content: Option<String>) -> Self {
        Self {
            iv: iv.unwrap_or_default(),
            content: content.unwrap_or_default(),
        }
    }

    /// `true` when either half is missing, meaning "no value set".
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.iv.is_empty() || self.content.is_empty()
    }
}

/// Why a non-blank field could not be decrypted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldFailure {
    /// IV is not hex or not 16 bytes.
    InvalidIv,
    /// Content is not valid Base64.
    InvalidEncoding,
    /// Ciphertext did not unpad (wrong key or corrupted bytes).
    Padding,
    /// Plaintext bytes are not UTF-8.
    InvalidUtf8,
}

impl FieldFailure {
    /// Short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidIv => "invalid_iv",
            Self::InvalidEncoding => "invalid_encoding",
            Self::Padding => "padding",
            Self::InvalidUtf8 => "invalid_utf8",
        }
    }
}

/// Tagged result of decrypting one field.
#[derive(Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// No field, or iv/content missing: nothing was ever stored.
    Absent,
    /// Decrypted successfully (may legitimately be `""`).
    Plaintext(String),
    /// A value was stored but could not be recovered.
    Failed(FieldFailure),
}

impl DecryptOutcome {
    /// Collapse to the throw-free string form.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Plaintext(s) => s,
            Self::Absent | Self::Failed(_) => String::new(),
        }
    }

    /// `true` for [`DecryptOutcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Debug for DecryptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Plaintext(_) => f.write_str("Plaintext(***)"),
            Self::Failed(why) => write!(f, "Failed({})", why.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Encrypts and decrypts individual string fields.
///
/// Immutable after construction and safe to share across threads.
pub struct CipherEnvelope {
    key: EnvelopeKey,
}

impl fmt::Debug for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEnvelope").field("key", &self.key).finish()
    }
}

impl CipherEnvelope {
    /// Build an envelope around a validated key.
    #[must_use]
    pub const fn new(key: EnvelopeKey) -> Self {
        Self { key }
    }

    /// Encrypt a possibly-absent value; `None` encrypts `""`.
    ///
    /// Every call draws a fresh 16-byte IV from `OsRng`.
    #[must_use]
    pub fn encrypt(&self, plaintext: Option<&str>) -> EncryptedField {
        self.encrypt_str(plaintext.unwrap_or_default())
    }

    /// Encrypt a string value.
    #[must_use]
    pub fn encrypt_str(&self, plaintext: &str) -> EncryptedField {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, &iv)
    }

    pub(crate) fn encrypt_with_iv(&self, plaintext: &str, iv: &[u8; IV_LEN]) -> EncryptedField {
        let ciphertext = self.key.key.encrypt(iv, plaintext.as_bytes());
        EncryptedField {
            iv: HEXLOWER.encode(iv),
            content: BASE64.encode(&ciphertext),
        }
    }

    /// Decrypt to a string, returning `""` for absent or undecryptable
    /// fields.
    ///
    /// A failed decrypt is logged at `warn` without any field data.
    #[must_use]
    pub fn decrypt(&self, field: Option<&EncryptedField>) -> String {
        match self.decrypt_outcome(field) {
            DecryptOutcome::Failed(why) => {
                tracing::warn!(reason = why.as_str(), "field decryption failed");
                String::new()
            }
            other => other.into_string(),
        }
    }

    /// Decrypt and report which of absent / plaintext / failed applies.
    #[must_use]
    pub fn decrypt_outcome(&self, field: Option<&EncryptedField>) -> DecryptOutcome {
        let Some(field) = field else {
            return DecryptOutcome::Absent;
        };
        if field.is_blank() {
            return DecryptOutcome::Absent;
        }

        let Some(iv) = parse_iv(&field.iv) else {
            return DecryptOutcome::Failed(FieldFailure::InvalidIv);
        };
        let Ok(ciphertext) = BASE64.decode(field.content.as_bytes()) else {
            return DecryptOutcome::Failed(FieldFailure::InvalidEncoding);
        };
        let Ok(plaintext) = self.key.key.decrypt(&iv, &ciphertext) else {
            return DecryptOutcome::Failed(FieldFailure::Padding);
        };

        match String::from_utf8(plaintext) {
            Ok(text) => DecryptOutcome::Plaintext(text),
            Err(e) => {
                e.into_bytes().zeroize();
                DecryptOutcome::Failed(FieldFailure::InvalidUtf8)
            }
        }
    }
}

/// Parse a hex IV, accepting either case; `None` unless it is 16 bytes.
pub(crate) fn parse_iv(hex: &str) -> Option<[u8; IV_LEN]> {
    let bytes = HEXLOWER_PERMISSIVE.decode(hex.as_bytes()).ok()?;
    bytes.try_into().ok()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "a-32-byte-long-super-secret-key!";

    fn envelope() -> CipherEnvelope {
        CipherEnvelope::new(EnvelopeKey::from_passphrase(TEST_KEY).expect("32-byte key"))
    }

    #[test]
    fn key_accepts_aes_sizes_only() {
        assert!(EnvelopeKey::new(&[0u8; 16]).is_ok());
        assert!(EnvelopeKey::new(&[0u8; 24]).is_ok());
        assert!(EnvelopeKey::new(&[0u8; 32]).is_ok());

        let err = EnvelopeKey::from_passphrase("too-short").expect_err("9 bytes");
        assert!(matches!(err, CryptoError::InvalidKeyMaterial(_)));
        assert!(EnvelopeKey::new(&[0u8; 33]).is_err());
    }

    #[test]
    fn key_length_counts_utf8_bytes() {
        // 15 ASCII bytes + "é" (2 bytes) = 17 bytes.
        assert!(EnvelopeKey::from_passphrase("abcdefghijklmnoé").is_err());
        // 14 ASCII bytes + "é" = 16 bytes.
        assert!(EnvelopeKey::from_passphrase("abcdefghijklmné").is_ok());
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let env = envelope();
        let field = env.encrypt_str("correct horse battery staple");
        assert_eq!(env.decrypt(Some(&field)), "correct horse battery staple");
    }

    #[test]
    fn iv_is_32_lowercase_hex_chars() {
        let field = envelope().encrypt_str("x");
        assert_eq!(field.iv.len(), 32);
        assert!(field.iv.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn none_encrypts_as_empty_string() {
        let env = envelope();
        let field = env.encrypt(None);
        assert!(!field.is_blank());
        assert_eq!(
            env.decrypt_outcome(Some(&field)),
            DecryptOutcome::Plaintext(String::new())
        );
    }

    #[test]
    fn fixed_iv_output_is_reproducible() {
        let env = envelope();
        let iv = [0x42u8; IV_LEN];
        let a = env.encrypt_with_iv("same", &iv);
        let b = env.encrypt_with_iv("same", &iv);
        assert_eq!(a, b);
        assert_eq!(a.iv, "42424242424242424242424242424242");
        // One AES block of padded ciphertext → 24 Base64 chars.
        assert_eq!(a.content.len(), 24);
    }

    #[test]
    fn absent_and_blank_fields_are_absent() {
        let env = envelope();
        assert_eq!(env.decrypt_outcome(None), DecryptOutcome::Absent);
        assert_eq!(
            env.decrypt_outcome(Some(&EncryptedField::default())),
            DecryptOutcome::Absent
        );
        let half = EncryptedField {
            iv: "00".repeat(16),
            content: String::new(),
        };
        assert_eq!(env.decrypt_outcome(Some(&half)), DecryptOutcome::Absent);
    }

    #[test]
    fn malformed_iv_is_reported() {
        let env = envelope();
        let mut field = env.encrypt_str("secret");
        field.iv = "zz".into();
        assert_eq!(
            env.decrypt_outcome(Some(&field)),
            DecryptOutcome::Failed(FieldFailure::InvalidIv)
        );
        field.iv = "00".repeat(8);
        assert_eq!(
            env.decrypt_outcome(Some(&field)),
            DecryptOutcome::Failed(FieldFailure::InvalidIv)
        );
        assert_eq!(env.decrypt(Some(&field)), "");
    }

    #[test]
    fn malformed_content_is_reported() {
        let env = envelope();
        let mut field = env.encrypt_str("secret");
        field.content = "not base64 at all!".into();
        assert_eq!(
            env.decrypt_outcome(Some(&field)),
            DecryptOutcome::Failed(FieldFailure::InvalidEncoding)
        );
    }

    #[test]
    fn uppercase_iv_is_accepted() {
        let env = envelope();
        let mut field = env.encrypt_str("mixed case iv");
        field.iv = field.iv.to_uppercase();
        assert_eq!(env.decrypt(Some(&field)), "mixed case iv");
    }

    #[test]
    fn outcome_debug_hides_plaintext() {
        let debug = format!("{:?}", DecryptOutcome::Plaintext("pin 1234".into()));
        assert_eq!(debug, "Plaintext(***)");
        assert!(!format!("{:?}", envelope()).contains("secret"));
    }

    #[test]
    fn field_serde_uses_iv_and_content_keys() {
        let field = envelope().encrypt_str("v");
        let json = serde_json::to_value(&field).expect("serialize");
        assert!(json.get("iv").is_some());
        assert!(json.get("content").is_some());

        let empty: EncryptedField = serde_json::from_str("{}").expect("deserialize {}");
        assert!(empty.is_blank());
    }

    #[test]
    fn envelope_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CipherEnvelope>();
    }
}
