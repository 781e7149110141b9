//! Passphrase-protected backup container.
//!
//! A backup is one JSON document encrypted as a whole:
//!
//! ```text
//! passphrase ──PBKDF2-HMAC-SHA256(salt, 10 000 it.)──> 256-bit key
//! serde_json(payload) ──AES-256-CBC/PKCS#7(key, iv)──> content
//! file = {"salt": hex(16), "iv": hex(16), "content": base64}
//! ```
//!
//! Salt and IV are drawn independently from `OsRng` on every export. The
//! passphrase is unrelated to both the account password and the field
//! envelope key.
//!
//! # Failure policy
//!
//! Every way opening a container can go wrong (unparsable file, bad hex, bad
//! Base64, padding, UTF-8, JSON) is reported as the single
//! [`CryptoError::BackupDecryption`]. The concrete cause is only visible in
//! `debug` logs.

use data_encoding::{BASE64, HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::aes_cbc::{AesKey, IV_LEN};
use crate::error::CryptoError;
use crate::kdf::{self, BACKUP_PARAMS};
use crate::memory::SecretBytes;

/// Backup salt length in bytes.
pub const BACKUP_SALT_LEN: usize = 16;

/// Backup AES key length in bytes.
pub const BACKUP_KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// The on-disk backup file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupContainer {
    /// KDF salt, hex.
    pub salt: String,
    /// CBC IV, hex.
    pub iv: String,
    /// Ciphertext, standard Base64.
    pub content: String,
}

impl BackupContainer {
    /// Render the container as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::BackupFormat` if serialization fails.
    pub fn to_json(&self) -> Result<String, CryptoError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CryptoError::BackupFormat(format!("container serialization: {e}")))
    }

    /// Parse a backup file.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::BackupDecryption` for anything that is not a
    /// `{salt, iv, content}` object, same as a wrong passphrase.
    pub fn from_json(text: &str) -> Result<Self, CryptoError> {
        serde_json::from_str(text).map_err(|e| {
            tracing::debug!(error = %e, "backup file is not a container");
            CryptoError::BackupDecryption
        })
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Derive the 256-bit backup key from a passphrase and salt.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if the salt is shorter than 16 bytes,
/// or `CryptoError::InvalidKeyMaterial` if the output has the wrong size.
pub fn derive_backup_key(
    passphrase: &str,
    salt: &[u8],
) -> Result<SecretBytes<BACKUP_KEY_LEN>, CryptoError> {
    let derived = kdf::derive(passphrase.as_bytes(), salt, &BACKUP_PARAMS)?;
    SecretBytes::from_slice(derived.expose())
}

// ---------------------------------------------------------------------------
// Encrypt
// ---------------------------------------------------------------------------

/// Serialize `payload` to JSON and seal it under `passphrase`.
///
/// # Errors
///
/// Returns `CryptoError::BackupFormat` if the payload does not serialize,
/// `CryptoError::SecureMemory` if the CSPRNG fails, or a KDF error.
pub fn encrypt_backup<T: Serialize>(
    payload: &T,
    passphrase: &str,
) -> Result<BackupContainer, CryptoError> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(payload)
            .map_err(|e| CryptoError::BackupFormat(format!("payload serialization: {e}")))?,
    );

    let salt = SecretBytes::<BACKUP_SALT_LEN>::random()?;
    let iv = SecretBytes::<IV_LEN>::random()?;
    let key = derive_backup_key(passphrase, salt.expose())?;
    let cipher = AesKey::from_slice(key.expose())?;

    let ciphertext = cipher.encrypt(iv.expose(), &plaintext);

    Ok(BackupContainer {
        salt: HEXLOWER.encode(salt.expose()),
        iv: HEXLOWER.encode(iv.expose()),
        content: BASE64.encode(&ciphertext),
    })
}

// ---------------------------------------------------------------------------
// Decrypt
// ---------------------------------------------------------------------------

/// Open a container and deserialize its payload as `T`.
///
/// A payload that is valid JSON but does not fit `T` is reported the same
/// way as a wrong passphrase.
///
/// # Errors
///
/// Returns `CryptoError::BackupDecryption` on any failure.
pub fn decrypt_backup<T: DeserializeOwned>(
    container: &BackupContainer,
    passphrase: &str,
) -> Result<T, CryptoError> {
    let plaintext = open(container, passphrase)?;
    serde_json::from_str(&plaintext).map_err(|e| {
        tracing::debug!(error = %e, "backup payload is not valid JSON for the expected shape");
        CryptoError::BackupDecryption
    })
}

/// Open a container into an untyped JSON value.
///
/// # Errors
///
/// Returns `CryptoError::BackupDecryption` on any failure.
pub fn decrypt_backup_value(
    container: &BackupContainer,
    passphrase: &str,
) -> Result<serde_json::Value, CryptoError> {
    decrypt_backup(container, passphrase)
}

/// Decrypt to UTF-8 text, mapping every failure to `BackupDecryption`.
fn open(container: &BackupContainer, passphrase: &str) -> Result<Zeroizing<String>, CryptoError> {
    let fail = |cause: &'static str| {
        tracing::debug!(cause, "backup decryption failed");
        CryptoError::BackupDecryption
    };

    let salt = HEXLOWER_PERMISSIVE
        .decode(container.salt.as_bytes())
        .map_err(|_| fail("salt is not hex"))?;
    if salt.len() != BACKUP_SALT_LEN {
        return Err(fail("salt has wrong length"));
    }
    let iv: [u8; IV_LEN] = HEXLOWER_PERMISSIVE
        .decode(container.iv.as_bytes())
        .ok()
        .and_then(|v| v.try_into().ok())
        .ok_or_else(|| fail("iv is not 16 hex-encoded bytes"))?;
    let ciphertext = BASE64
        .decode(container.content.as_bytes())
        .map_err(|_| fail("content is not base64"))?;

    let key = derive_backup_key(passphrase, &salt).map_err(|_| fail("key derivation"))?;
    let cipher = AesKey::from_slice(key.expose()).map_err(|_| fail("key size"))?;

    let plaintext = cipher
        .decrypt(&iv, &ciphertext)
        .map_err(|_| fail("padding check failed"))?;
    let text = String::from_utf8(plaintext).map_err(|e| {
        e.into_bytes().zeroize();
        fail("plaintext is not utf-8")
    })?;
    if text.is_empty() {
        return Err(fail("plaintext is empty"));
    }
    Ok(Zeroizing::new(text))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrip_value() {
        let payload = json!({"meta": {"userId": 7}, "data": {"notes": [{"title": "t"}]}});
        let container = encrypt_backup(&payload, "backup pass").expect("encrypt");
        let back = decrypt_backup_value(&container, "backup pass").expect("decrypt");
        assert_eq!(back, payload);
    }

    #[test]
    fn container_fields_have_expected_encoding() {
        let container = encrypt_backup(&json!({"a": 1}), "pw").expect("encrypt");
        assert_eq!(container.salt.len(), 32);
        assert_eq!(container.iv.len(), 32);
        assert!(BASE64.decode(container.content.as_bytes()).is_ok());
    }

    #[test]
    fn salt_and_iv_are_fresh_and_independent() {
        let a = encrypt_backup(&json!({"a": 1}), "pw").expect("encrypt a");
        let b = encrypt_backup(&json!({"a": 1}), "pw").expect("encrypt b");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.salt, a.iv);
        assert_ne!(a.content, b.content);
    }

    #[test]
    fn wrong_passphrase_is_uniform_error() {
        let container = encrypt_backup(&json!({"secret": true}), "right").expect("encrypt");
        let err = decrypt_backup_value(&container, "wrong").expect_err("must fail");
        assert!(matches!(err, CryptoError::BackupDecryption));
        assert_eq!(
            err.to_string(),
            "decryption failed: wrong passphrase or corrupted file"
        );
    }

    #[test]
    fn corrupted_fields_are_uniform_error() {
        let good = encrypt_backup(&json!({"x": "y"}), "pw").expect("encrypt");

        let mut bad_salt = good.clone();
        bad_salt.salt = "zz".into();
        let mut short_iv = good.clone();
        short_iv.iv = "0011".into();
        let mut bad_content = good.clone();
        bad_content.content = "!!!".into();

        for c in [bad_salt, short_iv, bad_content] {
            assert!(matches!(
                decrypt_backup_value(&c, "pw"),
                Err(CryptoError::BackupDecryption)
            ));
        }
    }

    #[test]
    fn typed_shape_mismatch_is_uniform_error() {
        #[derive(Deserialize)]
        struct Needs {
            #[allow(dead_code)]
            required: u32,
        }
        let container = encrypt_backup(&json!({"other": 1}), "pw").expect("encrypt");
        assert!(matches!(
            decrypt_backup::<Needs>(&container, "pw"),
            Err(CryptoError::BackupDecryption)
        ));
    }

    #[test]
    fn container_json_roundtrip_and_garbage() {
        let container = encrypt_backup(&json!([1, 2, 3]), "pw").expect("encrypt");
        let text = container.to_json().expect("to_json");
        assert_eq!(BackupContainer::from_json(&text).expect("from_json"), container);

        assert!(matches!(
            BackupContainer::from_json("{\"salt\": 1}"),
            Err(CryptoError::BackupDecryption)
        ));
        assert!(matches!(
            BackupContainer::from_json("not json"),
            Err(CryptoError::BackupDecryption)
        ));
    }

    #[test]
    fn backup_key_uses_decoded_salt_bytes() {
        let salt = [0xA5u8; BACKUP_SALT_LEN];
        let key = derive_backup_key("pw", &salt).expect("derive");
        let mut raw = [0u8; BACKUP_KEY_LEN];
        pbkdf2::pbkdf2_hmac::<sha2::Sha256>(b"pw", &salt, 10_000, &mut raw);
        assert_eq!(key.expose(), &raw);
    }
}
