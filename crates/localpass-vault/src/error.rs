//! Store error types for `localpass-vault`.

use localpass_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// `SQLite` error.
    #[error("database error: {0}")]
    Database(String),

    /// Migration error during schema upgrade.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required field is missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// Registration with a username that is already in use.
    #[error("username already exists")]
    UsernameTaken,

    /// Unknown username or wrong password; the two are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account matches the given username or id.
    #[error("user not found")]
    UserNotFound,

    /// Record id does not exist for this user.
    #[error("{kind} {id} not found or not owned by this user")]
    RecordNotFound {
        /// Section the lookup ran against (`"login"`, `"note"`, `"card"`).
        kind: &'static str,
        /// The requested row id.
        id: i64,
    },

    /// Backup belongs to a different account than the one importing it.
    #[error("backup file does not belong to the current user")]
    OwnershipMismatch {
        /// `meta.userId` from the backup; `None` when it is not an integer.
        backup_user: Option<i64>,
        /// The importing user.
        session_user: i64,
    },

    /// Import transaction rolled back.
    #[error("import failed, no changes applied: {0}")]
    ImportFailed(String),

    /// Export failure (nothing selected, payload build error).
    #[error("export error: {0}")]
    Export(String),

    /// Decrypted backup does not have the expected `{meta, data}` shape.
    #[error("import error: {0}")]
    Import(String),

    /// Preferences file could not be written.
    #[error("preferences error: {0}")]
    Preferences(String),
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// `true` if `err` is a `UNIQUE` constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Map a zero-row UPDATE/DELETE to [`VaultError::RecordNotFound`].
pub(crate) fn ensure_changed(
    changed: usize,
    kind: &'static str,
    id: i64,
) -> Result<(), VaultError> {
    if changed == 0 {
        Err(VaultError::RecordNotFound { kind, id })
    } else {
        Ok(())
    }
}

/// Reject an empty required field.
pub(crate) fn require(field: &str, value: &str) -> Result<(), VaultError> {
    if value.is_empty() {
        return Err(VaultError::Validation(format!("{field} is required")));
    }
    Ok(())
}
