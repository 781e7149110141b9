//! Fuzz target for applying a decrypted backup payload.
//!
//! Arbitrary JSON is parsed as a `BackupPayload` and applied to a fresh
//! in-memory store whose only user owns the payload. Must never panic, and
//! a failed apply must leave the user's sections empty.
//!
//! # Usage
//!
//! ```sh
//! cd crates/localpass-vault
//! cargo +nightly fuzz run backup_payload -- -max_len=8192
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use localpass_crypto_core::envelope::{CipherEnvelope, EnvelopeKey};
use localpass_vault::{apply_backup, BackupPayload, VaultDb};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<BackupPayload>(data) else {
        return;
    };
    let Ok(db) = VaultDb::open_in_memory() else {
        return;
    };
    let Ok(key) = EnvelopeKey::from_passphrase("fuzz-envelope-16") else {
        return;
    };
    let envelope = CipherEnvelope::new(key);

    let owner = payload.meta.user_id;
    if db
        .connection()
        .execute(
            "INSERT INTO users (id, username, password_hash, password_salt) \
             VALUES (?1, 'fuzz', 'h', 's')",
            [owner],
        )
        .is_err()
    {
        return;
    }

    if apply_backup(db.connection(), &envelope, owner, &payload).is_err() {
        for table in ["vault", "notes", "cards"] {
            let rows: i64 = db
                .connection()
                .query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))
                .unwrap_or(0);
            assert_eq!(rows, 0, "failed import left rows in {table}");
        }
    }
});
