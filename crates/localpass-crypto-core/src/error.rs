//! Cryptographic error types for `localpass-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (PBKDF2 output sizing, salt validation).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Invalid key material (wrong length, corrupted bytes).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Backup container could not be opened.
    ///
    /// Wrong passphrase and corrupted file are indistinguishable here.
    #[error("decryption failed: wrong passphrase or corrupted file")]
    BackupDecryption,

    /// Backup payload could not be serialized before encryption.
    #[error("backup format error: {0}")]
    BackupFormat(String),

    /// Secure memory allocation failure (mlock, CSPRNG).
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// Password generation failure (invalid parameters).
    #[error("password generation error: {0}")]
    PasswordGeneration(String),
}
