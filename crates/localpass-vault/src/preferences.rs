//! Non-sensitive user preferences, stored as plain JSON next to the store.
//!
//! Nothing secret lives here: the envelope key comes from the environment
//! and every secret column is enveloped inside the database.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use localpass_crypto_core::password::{
    CharsetConfig, DEFAULT_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};

use crate::error::VaultError;

// ── Top-level preferences ──────────────────────────────────────────

/// Persisted to `{data_dir}/preferences.json`. Every field has a default,
/// so a partial file loads cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Store file name, relative to the data directory unless absolute.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Where exports land when no output path is given.
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,

    /// Defaults for `generate`.
    #[serde(default)]
    pub generator: GeneratorPreferences,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            log_filter: default_log_filter(),
            backup_dir: None,
            generator: GeneratorPreferences::default(),
        }
    }
}

fn default_database_file() -> String {
    "db.sqlite".into()
}
fn default_log_filter() -> String {
    "info".into()
}

impl Preferences {
    /// Resolve [`database_file`](Self::database_file) against `data_dir`.
    #[must_use]
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    /// Reject values that would break the next start or `generate`.
    ///
    /// # Errors
    ///
    /// [`VaultError::Preferences`] for an empty database file name, an empty
    /// log filter, a generator length outside the supported range, or a
    /// generator with every charset disabled.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.database_file.trim().is_empty() {
            return Err(VaultError::Preferences("databaseFile must not be empty".into()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(VaultError::Preferences("logFilter must not be empty".into()));
        }
        let length = self.generator.length;
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(VaultError::Preferences(format!(
                "generator length {length} outside {MIN_PASSWORD_LENGTH}..={MAX_PASSWORD_LENGTH}"
            )));
        }
        if !self.generator.charsets().any_enabled() {
            return Err(VaultError::Preferences(
                "generator needs at least one charset".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the export directory, falling back to `data_dir`.
    #[must_use]
    pub fn backup_dir_or(&self, data_dir: &Path) -> PathBuf {
        self.backup_dir
            .clone()
            .unwrap_or_else(|| data_dir.to_path_buf())
    }
}

// ── Generator defaults ─────────────────────────────────────────────

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorPreferences {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "enabled")]
    pub uppercase: bool,
    #[serde(default = "enabled")]
    pub lowercase: bool,
    #[serde(default = "enabled")]
    pub digits: bool,
    #[serde(default = "enabled")]
    pub symbols: bool,
}

impl Default for GeneratorPreferences {
    fn default() -> Self {
        Self {
            length: default_length(),
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

const fn default_length() -> usize {
    DEFAULT_PASSWORD_LENGTH
}
const fn enabled() -> bool {
    true
}

impl GeneratorPreferences {
    /// The charset selection these preferences describe.
    #[must_use]
    pub const fn charsets(&self) -> CharsetConfig {
        CharsetConfig {
            uppercase: self.uppercase,
            lowercase: self.lowercase,
            digits: self.digits,
            symbols: self.symbols,
        }
    }
}

// ── File I/O ───────────────────────────────────────────────────────

const PREFERENCES_FILE: &str = "preferences.json";
const PREFERENCES_TMP: &str = ".preferences.json.tmp";

impl Preferences {
    /// Load preferences from `{data_dir}/preferences.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or
    /// contains invalid JSON.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(PREFERENCES_FILE);
        fs::read_to_string(&path).map_or_else(
            |_| Self::default(),
            |contents| {
                serde_json::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring corrupt preferences file");
                    Self::default()
                })
            },
        )
    }

    /// Persist preferences to `{data_dir}/preferences.json`.
    ///
    /// Writes to a temp file, restricts it to the owner on Unix, then
    /// renames it over the target.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Preferences`] if [`validate`](Self::validate) fails or
    ///   serialization fails; nothing is written
    /// - [`VaultError::Io`] if the directory is missing or the write or
    ///   rename is rejected
    pub fn save(&self, data_dir: &Path) -> Result<(), VaultError> {
        self.validate()?;
        let path = data_dir.join(PREFERENCES_FILE);
        let tmp = data_dir.join(PREFERENCES_TMP);

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Preferences(format!("failed to serialize: {e}")))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
