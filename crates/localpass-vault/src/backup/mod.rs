//! Encrypted backup payload and its export / import orchestration.
//!
//! The payload is plain JSON sealed by the crypto-core backup codec into a
//! `{salt, iv, content}` container. Secrets travel decrypted inside the
//! payload and are re-encrypted with the store envelope on import.

pub mod export;
pub mod import;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::logins::LoginEntry;
use crate::notes::Note;

/// Payload format version written into `meta.version`.
pub const BACKUP_FORMAT_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Decrypted contents of a backup file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupPayload {
    pub meta: BackupMeta,
    pub data: BackupData,
}

/// Ownership and provenance of a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    /// Id of the exporting user. Import refuses any other session user.
    pub user_id: i64,
    pub username: String,
    /// ISO 8601, UTC, millisecond precision.
    pub export_date: String,
    pub version: String,
}

/// Selected sections. An absent section is left untouched on import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<Vec<BackupLogin>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<BackupNote>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<BackupCard>>,
}

/// One login record.
///
/// Every field is optional on the way in: a record missing a required
/// column fails the insert and rolls the whole import back.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupLogin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for BackupLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupLogin")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl From<LoginEntry> for BackupLogin {
    fn from(entry: LoginEntry) -> Self {
        Self {
            id: Some(entry.id),
            service: Some(entry.service),
            username: Some(entry.username),
            password: Some(entry.password),
        }
    }
}

/// One secure note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<Note> for BackupNote {
    fn from(note: Note) -> Self {
        Self {
            id: Some(note.id),
            title: Some(note.title),
            content: Some(note.content),
        }
    }
}

/// One payment card.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackupCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub cardholder_name: Option<String>,
    pub card_number: Option<String>,
    pub expiry_month: Option<String>,
    pub expiry_year: Option<String>,
    pub cvv: Option<String>,
    pub gradient: Option<String>,
}

impl fmt::Debug for BackupCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupCard")
            .field("id", &self.id)
            .field("cardholder_name", &self.cardholder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

impl From<Card> for BackupCard {
    fn from(card: Card) -> Self {
        Self {
            id: Some(card.id),
            cardholder_name: Some(card.cardholder_name),
            card_number: Some(card.card_number),
            expiry_month: Some(card.expiry_month),
            expiry_year: Some(card.expiry_year),
            cvv: Some(card.cvv),
            gradient: Some(card.gradient),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
