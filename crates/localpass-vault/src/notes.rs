//! Secure notes: plaintext title, enveloped body.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField};

use crate::error::{ensure_changed, require, VaultError};

/// A decrypted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// Fields for creating or replacing a note. An empty body is allowed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

pub(crate) fn insert_note(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    title: Option<&str>,
    content: Option<&str>,
) -> rusqlite::Result<i64> {
    let sealed = envelope.encrypt(content);
    conn.execute(
        "INSERT INTO notes (user_id, title, content_iv, content_content) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, title, sealed.iv, sealed.content],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Add a note for `user_id`.
///
/// # Errors
///
/// - [`VaultError::Validation`] if the title is empty
/// - [`VaultError::Database`] if the INSERT fails
pub fn add_note(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    input: &NoteInput,
) -> Result<Note, VaultError> {
    require("title", &input.title)?;
    let id = insert_note(conn, envelope, user_id, Some(&input.title), Some(&input.content))
        .map_err(|e| VaultError::Database(format!("failed to insert note: {e}")))?;
    Ok(Note {
        id,
        title: input.title.clone(),
        content: input.content.clone(),
    })
}

/// All notes of `user_id`, ordered by title (case-insensitive).
///
/// # Errors
///
/// Returns [`VaultError::Database`] if the query fails.
pub fn list_notes(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
) -> Result<Vec<Note>, VaultError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, content_iv, content_content FROM notes \
             WHERE user_id = ?1 ORDER BY title COLLATE NOCASE",
        )
        .map_err(|e| VaultError::Database(format!("failed to prepare note list: {e}")))?;

    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                EncryptedField::from_columns(row.get(2)?, row.get(3)?),
            ))
        })
        .map_err(|e| VaultError::Database(format!("failed to list notes: {e}")))?;

    rows.map(|row| {
        let (id, title, sealed) =
            row.map_err(|e| VaultError::Database(format!("row read error: {e}")))?;
        Ok(Note {
            id,
            title,
            content: envelope.decrypt(Some(&sealed)),
        })
    })
    .collect()
}

/// Replace a note's title and body.
///
/// # Errors
///
/// - [`VaultError::Validation`] if the title is empty
/// - [`VaultError::RecordNotFound`] if `id` does not belong to `user_id`
/// - [`VaultError::Database`] if the UPDATE fails
pub fn update_note(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    id: i64,
    input: &NoteInput,
) -> Result<(), VaultError> {
    require("title", &input.title)?;
    let sealed = envelope.encrypt_str(&input.content);
    let changed = conn
        .execute(
            "UPDATE notes SET title = ?1, content_iv = ?2, content_content = ?3 \
             WHERE id = ?4 AND user_id = ?5",
            params![input.title, sealed.iv, sealed.content, id, user_id],
        )
        .map_err(|e| VaultError::Database(format!("failed to update note: {e}")))?;
    ensure_changed(changed, "note", id)
}

/// Delete a note.
///
/// # Errors
///
/// - [`VaultError::RecordNotFound`] if `id` does not belong to `user_id`
/// - [`VaultError::Database`] if the DELETE fails
pub fn delete_note(conn: &Connection, user_id: i64, id: i64) -> Result<(), VaultError> {
    let changed = conn
        .execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
        .map_err(|e| VaultError::Database(format!("failed to delete note: {e}")))?;
    ensure_changed(changed, "note", id)
}
