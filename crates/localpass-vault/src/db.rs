//! `SQLite` connection setup and migration runner.
//!
//! The store file holds plaintext metadata (usernames, services, titles)
//! next to envelope-encrypted `<name>_iv` / `<name>_content` column pairs.
//! No database-level encryption: secrets are protected per field.

use std::fmt;
use std::path::Path;

use rusqlite::Connection;

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Embedded migrations
// ---------------------------------------------------------------------------

/// Forward-only SQL migrations, embedded at compile time.
/// Index 0 → version 1, index 1 → version 2, etc.
const MIGRATIONS: &[&str] = &[include_str!("../migrations/001_initial_schema.sql")];

/// Schema version after all migrations have run.
#[must_use]
pub fn latest_schema_version() -> usize {
    MIGRATIONS.len()
}

// ---------------------------------------------------------------------------
// VaultDb
// ---------------------------------------------------------------------------

/// Handle to an open, migrated store.
pub struct VaultDb {
    conn: Connection,
}

impl fmt::Debug for VaultDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultDb")
    }
}

impl VaultDb {
    /// Open (or create) the store at `path`.
    ///
    /// Enables WAL journaling and foreign-key enforcement (needed for the
    /// `ON DELETE CASCADE` from `users`), then applies pending migrations.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Database`] if the file cannot be opened.
    /// - [`VaultError::Migration`] if a migration fails.
    pub fn open(path: &Path) -> Result<Self, VaultError> {
        let conn = Connection::open(path)
            .map_err(|e| VaultError::Database(format!("failed to open {}: {e}", path.display())))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn)
    }

    /// Open a private in-memory store (tests, dry runs).
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_in_memory() -> Result<Self, VaultError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, VaultError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Self { conn };
        db.run_migrations()?;
        tracing::debug!(version = db.schema_version()?, "store ready");
        Ok(db)
    }

    /// Returns a reference to the underlying [`rusqlite::Connection`].
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the current schema version (`PRAGMA user_version`).
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Database`] if the pragma query fails.
    pub fn schema_version(&self) -> Result<i32, VaultError> {
        let v: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(v)
    }

    // -----------------------------------------------------------------------
    // Migration runner
    // -----------------------------------------------------------------------

    /// Apply all pending migrations sequentially, one transaction each.
    fn run_migrations(&mut self) -> Result<(), VaultError> {
        let current = self.schema_version()?;

        for (idx, sql) in MIGRATIONS.iter().enumerate() {
            let version = idx
                .checked_add(1)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| VaultError::Migration("migration index overflow".into()))?;

            if version <= current {
                continue;
            }

            let tx = self.conn.transaction().map_err(|e| {
                VaultError::Migration(format!(
                    "failed to start transaction for migration {version}: {e}"
                ))
            })?;

            tx.execute_batch(sql)
                .map_err(|e| VaultError::Migration(format!("migration {version} failed: {e}")))?;

            tx.pragma_update(None, "user_version", version)
                .map_err(|e| {
                    VaultError::Migration(format!(
                        "failed to update user_version to {version}: {e}"
                    ))
                })?;

            tx.commit().map_err(|e| {
                VaultError::Migration(format!("failed to commit migration {version}: {e}"))
            })?;
            tracing::info!(version, "applied store migration");
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
