//! `localpass-vault`: record store for LocalPass.
//!
//! `SQLite` schema and migrations, accounts, the three record sections
//! (logins, notes, cards), encrypted backup export/import, the password
//! health report and the preferences file.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod db;
pub mod error;

pub mod users;

pub mod cards;
pub mod logins;
pub mod notes;

pub mod backup;

pub mod health;

pub mod preferences;

pub use backup::export::{backup_file_name, build_payload, export_backup, ExportSections};
pub use backup::import::{apply_backup, import_backup, ImportSummary};
pub use backup::{
    BackupCard, BackupData, BackupLogin, BackupMeta, BackupNote, BackupPayload,
    BACKUP_FORMAT_VERSION,
};
pub use cards::{add_card, delete_card, list_cards, update_card, Card, CardInput};
pub use db::VaultDb;
pub use error::VaultError;
pub use health::{
    analyze_logins, evaluate_password_strength, HealthReport, Strength, StrengthScore,
};
pub use logins::{add_login, delete_login, list_logins, update_login, LoginEntry, LoginInput};
pub use notes::{add_note, delete_note, list_notes, update_note, Note, NoteInput};
pub use preferences::{GeneratorPreferences, Preferences};
pub use rusqlite::Connection;
pub use users::{
    authenticate, delete_user, get_user, list_users, register_user, reset_password,
    security_questions, verify_security_answers, Registration, SecurityQuestions, UserSummary,
};
