//! `localpass-crypto-core`: cryptographic core for LocalPass.
//!
//! Field envelope, credential hashing, backup codec and password
//! generation. No I/O, no async, no database: everything here is a pure
//! function over its inputs plus the OS CSPRNG.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;

mod aes_cbc;
pub mod envelope;

pub mod credential;

pub mod backup;

pub mod password;

pub use aes_cbc::IV_LEN;
pub use backup::{
    decrypt_backup, decrypt_backup_value, derive_backup_key, encrypt_backup, BackupContainer,
};
pub use credential::{
    answers_match, constant_time_eq, hash_password, verify_password, CredentialRecord,
};
pub use envelope::{CipherEnvelope, DecryptOutcome, EncryptedField, EnvelopeKey, FieldFailure};
pub use error::CryptoError;
pub use kdf::{derive, Pbkdf2Params, BACKUP_PARAMS, CREDENTIAL_PARAMS};
pub use memory::{disable_core_dumps, SecretBuffer, SecretBytes};
pub use password::{generate_password, CharsetConfig, DEFAULT_PASSWORD_LENGTH};
