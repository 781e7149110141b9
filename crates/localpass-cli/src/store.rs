//! Opened store plus the field envelope, built once per process.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};

use localpass_crypto_core::envelope::{CipherEnvelope, EnvelopeKey};
use localpass_vault::{authenticate, Connection, Preferences, UserSummary, VaultDb};

use crate::cli::Credentials;

pub struct Store {
    db: VaultDb,
    envelope: CipherEnvelope,
}

impl Store {
    /// Validate the envelope key, then open (or create) the store.
    ///
    /// The key is checked first so a misconfigured process never touches
    /// the database file.
    ///
    /// # Errors
    ///
    /// Fails if the key is missing or has the wrong length, the data
    /// directory cannot be created, or the store cannot be opened.
    pub fn open(
        data_dir: &Path,
        prefs: &Preferences,
        encryption_key: Option<&str>,
    ) -> anyhow::Result<Self> {
        let envelope = envelope_from(encryption_key)?;

        fs::create_dir_all(data_dir)
            .with_context(|| format!("cannot create data directory {}", data_dir.display()))?;
        let path = prefs.database_path(data_dir);
        let db = VaultDb::open(&path)
            .with_context(|| format!("cannot open store {}", path.display()))?;
        tracing::debug!(path = %path.display(), "store opened");

        Ok(Self { db, envelope })
    }

    /// In-memory store for tests.
    #[cfg(test)]
    pub fn in_memory(encryption_key: &str) -> anyhow::Result<Self> {
        Ok(Self {
            db: VaultDb::open_in_memory()?,
            envelope: envelope_from(Some(encryption_key))?,
        })
    }

    pub const fn conn(&self) -> &Connection {
        self.db.connection()
    }

    pub const fn envelope(&self) -> &CipherEnvelope {
        &self.envelope
    }

    /// Authenticate the acting user.
    ///
    /// # Errors
    ///
    /// Fails with the vault's `InvalidCredentials` for a wrong name or
    /// password.
    pub fn login(&self, creds: &Credentials) -> anyhow::Result<UserSummary> {
        Ok(authenticate(self.conn(), &creds.user, &creds.password)?)
    }
}

fn envelope_from(key: Option<&str>) -> anyhow::Result<CipherEnvelope> {
    let key = key.ok_or_else(|| anyhow!("LOCALPASS_ENCRYPTION_KEY is not set"))?;
    let key = EnvelopeKey::from_passphrase(key)
        .context("LOCALPASS_ENCRYPTION_KEY must be exactly 16, 24 or 32 bytes")?;
    Ok(CipherEnvelope::new(key))
}
