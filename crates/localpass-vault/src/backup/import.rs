//! Backup import: open, check ownership, replace sections atomically.
//!
//! Each present section replaces the user's rows in that table. All
//! sections are written inside one transaction; any failed insert drops
//! the transaction without commit, leaving the store as it was.

use rusqlite::{params, Connection};
use serde::Serialize;

use localpass_crypto_core::backup::{decrypt_backup_value, BackupContainer};
use localpass_crypto_core::envelope::CipherEnvelope;

use super::{BackupData, BackupPayload};
use crate::cards::{self, CardRow};
use crate::error::VaultError;
use crate::logins;
use crate::notes;

/// Rows written per section; `None` for sections absent from the backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub vault: Option<usize>,
    pub notes: Option<usize>,
    pub cards: Option<usize>,
}

/// Open `container` with `passphrase` and apply it for `user_id`.
///
/// # Errors
///
/// - [`VaultError::Crypto`] wrapping `BackupDecryption` for a wrong
///   passphrase or corrupted file
/// - [`VaultError::OwnershipMismatch`] if `meta.userId` is anything but
///   `user_id`, including a non-integer value
/// - [`VaultError::Import`] if the decrypted JSON is not a backup payload
/// - see [`apply_backup`] for the rest
pub fn import_backup(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    container: &BackupContainer,
    passphrase: &str,
) -> Result<ImportSummary, VaultError> {
    let value = decrypt_backup_value(container, passphrase)?;
    // Any owner that is not this user's integer id, a string id included,
    // is a foreign backup rather than a malformed one.
    if let Some(owner) = value.pointer("/meta/userId").filter(|v| !v.is_null()) {
        ensure_owner(owner.as_i64(), user_id)?;
    }
    let payload: BackupPayload = serde_json::from_value(value)
        .map_err(|e| VaultError::Import(format!("not a backup payload: {e}")))?;
    apply_backup(conn, envelope, user_id, &payload)
}

/// Replace `user_id`'s sections with the records in `payload`.
///
/// # Errors
///
/// - [`VaultError::OwnershipMismatch`] if the backup was exported by another
///   user; nothing is touched
/// - [`VaultError::ImportFailed`] if any statement fails; nothing is applied
pub fn apply_backup(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    payload: &BackupPayload,
) -> Result<ImportSummary, VaultError> {
    ensure_owner(Some(payload.meta.user_id), user_id)?;

    let failed = |e: rusqlite::Error| {
        tracing::warn!(error = %e, "import rolled back");
        VaultError::ImportFailed(e.to_string())
    };

    // Dropped without commit on any early return.
    let tx = conn.unchecked_transaction().map_err(failed)?;
    let summary = write_sections(&tx, envelope, user_id, &payload.data).map_err(failed)?;
    tx.commit().map_err(failed)?;

    tracing::info!(
        user_id,
        vault = summary.vault,
        notes = summary.notes,
        cards = summary.cards,
        "backup imported"
    );
    Ok(summary)
}

fn ensure_owner(backup_user: Option<i64>, user_id: i64) -> Result<(), VaultError> {
    if backup_user == Some(user_id) {
        return Ok(());
    }
    tracing::warn!(
        ?backup_user,
        session_user = user_id,
        "refusing backup that belongs to another user"
    );
    Err(VaultError::OwnershipMismatch {
        backup_user,
        session_user: user_id,
    })
}

fn write_sections(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user_id: i64,
    data: &BackupData,
) -> rusqlite::Result<ImportSummary> {
    let vault = data
        .vault
        .as_ref()
        .map(|records| {
            conn.execute("DELETE FROM vault WHERE user_id = ?1", params![user_id])?;
            for r in records {
                logins::insert_login(
                    conn,
                    envelope,
                    user_id,
                    r.service.as_deref(),
                    r.username.as_deref(),
                    r.password.as_deref(),
                )?;
            }
            Ok::<_, rusqlite::Error>(records.len())
        })
        .transpose()?;

    let notes = data
        .notes
        .as_ref()
        .map(|records| {
            conn.execute("DELETE FROM notes WHERE user_id = ?1", params![user_id])?;
            for r in records {
                notes::insert_note(
                    conn,
                    envelope,
                    user_id,
                    r.title.as_deref(),
                    r.content.as_deref(),
                )?;
            }
            Ok::<_, rusqlite::Error>(records.len())
        })
        .transpose()?;

    let cards = data
        .cards
        .as_ref()
        .map(|records| {
            conn.execute("DELETE FROM cards WHERE user_id = ?1", params![user_id])?;
            for r in records {
                let row = CardRow {
                    cardholder_name: r.cardholder_name.as_deref(),
                    card_number: r.card_number.as_deref(),
                    expiry_month: r.expiry_month.as_deref(),
                    expiry_year: r.expiry_year.as_deref(),
                    cvv: r.cvv.as_deref(),
                    gradient: r.gradient.as_deref(),
                };
                cards::insert_card(conn, envelope, user_id, &row)?;
            }
            Ok::<_, rusqlite::Error>(records.len())
        })
        .transpose()?;

    Ok(ImportSummary {
        vault,
        notes,
        cards,
    })
}
