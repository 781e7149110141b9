//! Login credentials (`vault` table).
//!
//! `service` and `username` are plaintext; the password is stored as an
//! envelope pair `password_iv` / `password_content` and re-encrypted in full
//! on every update.

use std::fmt;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField};

use crate::error::{ensure_changed, require, VaultError};

/// A decrypted login as returned to callers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEntry {
    pub id: i64,
    pub service: String,
    pub username: String,
    /// `""` when no password was set or it could not be decrypted.
    pub password: String,
}

impl fmt::Debug for LoginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginEntry")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Fields for creating or replacing a login.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub service: String,
    pub username: String,
    /// `None` stores an encrypted empty string.
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginInput {
    fn validate(&self) -> Result<(), VaultError> {
        require("service", &self.service)?;
        require("username", &self.username)
    }
}

/// Insert one row. Nullable inputs let a malformed backup record fail on the
/// `NOT NULL` constraint inside the import transaction.
pub(crate) fn insert_login(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    service: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> rusqlite::Result<i64> {
    let sealed = envelope.encrypt(password);
    conn.execute(
        "INSERT INTO vault (user_id, service, username, password_iv, password_content) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user_id, service, username, sealed.iv, sealed.content],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Add a login for `user_id`.
///
/// # Errors
///
/// - [`VaultError::Validation`] if service or username is empty
/// - [`VaultError::Database`] if the INSERT fails
pub fn add_login(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    input: &LoginInput,
) -> Result<LoginEntry, VaultError> {
    input.validate()?;
    let id = insert_login(
        conn,
        envelope,
        user_id,
        Some(&input.service),
        Some(&input.username),
        input.password.as_deref(),
    )
    .map_err(|e| VaultError::Database(format!("failed to insert login: {e}")))?;

    tracing::debug!(user_id, login_id = id, "login added");
    Ok(LoginEntry {
        id,
        service: input.service.clone(),
        username: input.username.clone(),
        password: input.password.clone().unwrap_or_default(),
    })
}

/// All logins of `user_id`, ordered by service (case-insensitive).
///
/// Undecryptable passwords come back as `""`.
///
/// # Errors
///
/// Returns [`VaultError::Database`] if the query fails.
pub fn list_logins(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
) -> Result<Vec<LoginEntry>, VaultError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, service, username, password_iv, password_content FROM vault \
             WHERE user_id = ?1 ORDER BY service COLLATE NOCASE",
        )
        .map_err(|e| VaultError::Database(format!("failed to prepare login list: {e}")))?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                EncryptedField::from_columns(row.get(3)?, row.get(4)?),
            ))
        })
        .map_err(|e| VaultError::Database(format!("failed to list logins: {e}")))?;

    let mut result = Vec::new();
    for row in rows {
        let (id, service, username, sealed) =
            row.map_err(|e| VaultError::Database(format!("row read error: {e}")))?;
        result.push(LoginEntry {
            id,
            service,
            username,
            password: envelope.decrypt(Some(&sealed)),
        });
    }
    Ok(result)
}

/// Replace a login's fields, re-encrypting the password.
///
/// # Errors
///
/// - [`VaultError::Validation`] if service or username is empty
/// - [`VaultError::RecordNotFound`] if `id` does not belong to `user_id`
/// - [`VaultError::Database`] if the UPDATE fails
pub fn update_login(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    id: i64,
    input: &LoginInput,
) -> Result<(), VaultError> {
    input.validate()?;
    let sealed = envelope.encrypt(input.password.as_deref());
    let changed = conn
        .execute(
            "UPDATE vault SET service = ?1, username = ?2, password_iv = ?3, \
             password_content = ?4 WHERE id = ?5 AND user_id = ?6",
            params![input.service, input.username, sealed.iv, sealed.content, id, user_id],
        )
        .map_err(|e| VaultError::Database(format!("failed to update login: {e}")))?;
    ensure_changed(changed, "login", id)
}

/// Delete a login.
///
/// # Errors
///
/// - [`VaultError::RecordNotFound`] if `id` does not belong to `user_id`
/// - [`VaultError::Database`] if the DELETE fails
pub fn delete_login(conn: &Connection, user_id: i64, id: i64) -> Result<(), VaultError> {
    let changed = conn
        .execute(
            "DELETE FROM vault WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
        .map_err(|e| VaultError::Database(format!("failed to delete login: {e}")))?;
    ensure_changed(changed, "login", id)
}
