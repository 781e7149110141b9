//! Accounts: registration, login, deletion and password recovery.
//!
//! The master password is stored one-way ([`hash_password`]); the two
//! security answers are stored through the [`CipherEnvelope`] so they can be
//! compared again during recovery.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use localpass_crypto_core::credential::{answers_match, hash_password, verify_password};
use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField};

use crate::error::{is_unique_violation, VaultError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Row id; the owner key for every other table.
    pub id: i64,
    /// Unique login name.
    pub username: String,
}

/// Input for [`register_user`]. Every field is required.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub question1: String,
    pub answer1: String,
    pub question2: String,
    pub answer2: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("question1", &self.question1)
            .field("question2", &self.question2)
            .finish_non_exhaustive()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.password.zeroize();
        self.answer1.zeroize();
        self.answer2.zeroize();
    }
}

/// The two recovery questions of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityQuestions {
    pub question1: String,
    pub question2: String,
}

// ---------------------------------------------------------------------------
// Registration / login
// ---------------------------------------------------------------------------

/// Create an account.
///
/// # Errors
///
/// - [`VaultError::Validation`] if any field is empty
/// - [`VaultError::UsernameTaken`] if the username exists
/// - [`VaultError::Crypto`] if hashing fails
/// - [`VaultError::Database`] if the INSERT fails
pub fn register_user(
    conn: &Connection,
    envelope: &CipherEnvelope,
    reg: &Registration,
) -> Result<UserSummary, VaultError> {
    let required = [
        &reg.username,
        &reg.password,
        &reg.question1,
        &reg.answer1,
        &reg.question2,
        &reg.answer2,
    ];
    if required.iter().any(|s| s.is_empty()) {
        return Err(VaultError::Validation(
            "all fields, including security questions and answers, are required".into(),
        ));
    }

    let cred = hash_password(&reg.password)?;
    let answer1 = envelope.encrypt_str(&reg.answer1);
    let answer2 = envelope.encrypt_str(&reg.answer2);

    conn.execute(
        "INSERT INTO users (username, password_hash, password_salt, \
         question1, answer1_iv, answer1_content, question2, answer2_iv, answer2_content) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            reg.username,
            cred.password_hash,
            cred.password_salt,
            reg.question1,
            answer1.iv,
            answer1.content,
            reg.question2,
            answer2.iv,
            answer2.content,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            VaultError::UsernameTaken
        } else {
            VaultError::Database(format!("failed to insert user: {e}"))
        }
    })?;

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, "registered user");
    Ok(UserSummary {
        id,
        username: reg.username.clone(),
    })
}

/// Check a username/password pair.
///
/// # Errors
///
/// - [`VaultError::InvalidCredentials`] for an unknown user or wrong password
/// - [`VaultError::Database`] if the query fails
pub fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<UserSummary, VaultError> {
    let row = conn
        .query_row(
            "SELECT id, password_hash, password_salt FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .map_err(|e| VaultError::Database(format!("failed to query user: {e}")))?;

    let Some((id, hash, salt)) = row else {
        tracing::debug!("login for unknown user");
        return Err(VaultError::InvalidCredentials);
    };
    if !verify_password(password, &salt, &hash) {
        tracing::debug!(user_id = id, "login with wrong password");
        return Err(VaultError::InvalidCredentials);
    }

    Ok(UserSummary {
        id,
        username: username.to_string(),
    })
}

/// All accounts, id and username only.
///
/// # Errors
///
/// Returns [`VaultError::Database`] if the query fails.
pub fn list_users(conn: &Connection) -> Result<Vec<UserSummary>, VaultError> {
    let mut stmt = conn
        .prepare("SELECT id, username FROM users ORDER BY id")
        .map_err(|e| VaultError::Database(format!("failed to prepare user list: {e}")))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        })
        .map_err(|e| VaultError::Database(format!("failed to list users: {e}")))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| VaultError::Database(format!("row read error: {e}")))
}

/// Delete an account; logins, notes and cards go with it (`ON DELETE CASCADE`).
///
/// # Errors
///
/// - [`VaultError::UserNotFound`] if no row was deleted
/// - [`VaultError::Database`] if the DELETE fails
pub fn delete_user(conn: &Connection, user_id: i64) -> Result<(), VaultError> {
    let changed = conn
        .execute("DELETE FROM users WHERE id = ?1", params![user_id])
        .map_err(|e| VaultError::Database(format!("failed to delete user: {e}")))?;
    if changed == 0 {
        return Err(VaultError::UserNotFound);
    }
    tracing::info!(user_id, "deleted user and all owned records");
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// The recovery questions for `username`.
///
/// # Errors
///
/// - [`VaultError::UserNotFound`] if the user is unknown or has no questions
/// - [`VaultError::Database`] if the query fails
pub fn security_questions(
    conn: &Connection,
    username: &str,
) -> Result<SecurityQuestions, VaultError> {
    let row = conn
        .query_row(
            "SELECT question1, question2 FROM users WHERE username = ?1",
            params![username],
            |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?)),
        )
        .optional()
        .map_err(|e| VaultError::Database(format!("failed to query questions: {e}")))?;

    match row {
        Some((Some(question1), question2)) if !question1.is_empty() => Ok(SecurityQuestions {
            question1,
            question2: question2.unwrap_or_default(),
        }),
        _ => Err(VaultError::UserNotFound),
    }
}

/// Check both recovery answers.
///
/// Comparison is trimmed, case-insensitive and constant-time; see
/// [`answers_match`].
///
/// # Errors
///
/// - [`VaultError::Validation`] if either supplied answer is empty
/// - [`VaultError::UserNotFound`] if the user is unknown
/// - [`VaultError::InvalidCredentials`] if either answer is wrong
/// - [`VaultError::Database`] if the query fails
pub fn verify_security_answers(
    conn: &Connection,
    envelope: &CipherEnvelope,
    username: &str,
    answer1: &str,
    answer2: &str,
) -> Result<(), VaultError> {
    if answer1.is_empty() || answer2.is_empty() {
        return Err(VaultError::Validation("both answers are required".into()));
    }

    let row = conn
        .query_row(
            "SELECT answer1_iv, answer1_content, answer2_iv, answer2_content \
             FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok((
                    EncryptedField::from_columns(row.get(0)?, row.get(1)?),
                    EncryptedField::from_columns(row.get(2)?, row.get(3)?),
                ))
            },
        )
        .optional()
        .map_err(|e| VaultError::Database(format!("failed to query answers: {e}")))?;

    let Some((stored1, stored2)) = row else {
        return Err(VaultError::UserNotFound);
    };

    // Evaluate both so the outcome does not reveal which one was wrong.
    let ok1 = answers_match(envelope, Some(&stored1), answer1);
    let ok2 = answers_match(envelope, Some(&stored2), answer2);
    if ok1 & ok2 {
        Ok(())
    } else {
        Err(VaultError::InvalidCredentials)
    }
}

/// Replace the master password of `username` with a freshly salted hash.
///
/// # Errors
///
/// - [`VaultError::Validation`] if `new_password` is empty
/// - [`VaultError::UserNotFound`] if no row was updated
/// - [`VaultError::Database`] if the UPDATE fails
pub fn reset_password(
    conn: &Connection,
    username: &str,
    new_password: &str,
) -> Result<(), VaultError> {
    if new_password.is_empty() {
        return Err(VaultError::Validation("new password is required".into()));
    }
    let cred = hash_password(new_password)?;
    let changed = conn
        .execute(
            "UPDATE users SET password_hash = ?1, password_salt = ?2 WHERE username = ?3",
            params![cred.password_hash, cred.password_salt, username],
        )
        .map_err(|e| VaultError::Database(format!("failed to update password: {e}")))?;
    if changed == 0 {
        return Err(VaultError::UserNotFound);
    }
    tracing::info!("master password reset");
    Ok(())
}

/// Look up one account by id.
///
/// # Errors
///
/// - [`VaultError::UserNotFound`] if the id is unknown
/// - [`VaultError::Database`] if the query fails
pub fn get_user(conn: &Connection, user_id: i64) -> Result<UserSummary, VaultError> {
    conn.query_row(
        "SELECT id, username FROM users WHERE id = ?1",
        params![user_id],
        |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                username: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| VaultError::Database(format!("failed to query user: {e}")))?
    .ok_or(VaultError::UserNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
