//! Backup export: read selected sections, build the payload, seal it.

use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use localpass_crypto_core::backup::{encrypt_backup, BackupContainer};
use localpass_crypto_core::envelope::CipherEnvelope;

use super::{BackupData, BackupMeta, BackupPayload, BACKUP_FORMAT_VERSION};
use crate::cards;
use crate::error::VaultError;
use crate::logins;
use crate::notes;
use crate::users::UserSummary;

/// Which record sections go into a backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSections {
    pub vault: bool,
    pub notes: bool,
    pub cards: bool,
}

impl ExportSections {
    /// Every section selected.
    pub const ALL: Self = Self {
        vault: true,
        notes: true,
        cards: true,
    };

    /// `true` if no section is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.vault || self.notes || self.cards)
    }
}

/// Read the selected sections of `user` into a plaintext payload.
///
/// # Errors
///
/// - [`VaultError::Export`] if no section is selected
/// - [`VaultError::Database`] if a section cannot be read
pub fn build_payload(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user: &UserSummary,
    sections: ExportSections,
) -> Result<BackupPayload, VaultError> {
    if sections.is_empty() {
        return Err(VaultError::Export(
            "select at least one section to export".into(),
        ));
    }

    let mut data = BackupData::default();
    if sections.vault {
        let rows = logins::list_logins(conn, envelope, user.id)?;
        data.vault = Some(rows.into_iter().map(Into::into).collect());
    }
    if sections.notes {
        let rows = notes::list_notes(conn, envelope, user.id)?;
        data.notes = Some(rows.into_iter().map(Into::into).collect());
    }
    if sections.cards {
        let rows = cards::list_cards(conn, envelope, user.id)?;
        data.cards = Some(rows.into_iter().map(Into::into).collect());
    }

    Ok(BackupPayload {
        meta: BackupMeta {
            user_id: user.id,
            username: user.username.clone(),
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: BACKUP_FORMAT_VERSION.to_string(),
        },
        data,
    })
}

/// Export the selected sections of `user` as a sealed backup container.
///
/// # Errors
///
/// - [`VaultError::Export`] if no section is selected
/// - [`VaultError::Database`] if a section cannot be read
/// - [`VaultError::Crypto`] if sealing fails
pub fn export_backup(
    conn: &Connection,
    envelope: &CipherEnvelope,
    user: &UserSummary,
    sections: ExportSections,
    passphrase: &str,
) -> Result<BackupContainer, VaultError> {
    let payload = build_payload(conn, envelope, user, sections)?;
    let container = encrypt_backup(&payload, passphrase)?;

    tracing::info!(
        user_id = user.id,
        vault = payload.data.vault.as_ref().map(Vec::len),
        notes = payload.data.notes.as_ref().map(Vec::len),
        cards = payload.data.cards.as_ref().map(Vec::len),
        "backup exported"
    );
    Ok(container)
}

/// Suggested file name: `localpass_backup_<username>_<YYYY-MM-DD>.json`.
///
/// Path separators in the username are replaced with `_`.
#[must_use]
pub fn backup_file_name(username: &str, date: NaiveDate) -> String {
    let safe: String = username
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("localpass_backup_{safe}_{}.json", date.format("%Y-%m-%d"))
}
