//! Fuzz target for backup file parsing and opening.
//!
//! Feeds arbitrary text to `BackupContainer::from_json` and opens whatever
//! parses. Must never panic; every failure is `BackupDecryption`.
//!
//! # Usage
//!
//! ```sh
//! cd crates/localpass-vault
//! cargo +nightly fuzz run backup_container -- -max_len=4096
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use localpass_crypto_core::backup::{decrypt_backup_value, BackupContainer};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(container) = BackupContainer::from_json(s) {
            let _ = decrypt_backup_value(&container, "fuzz");
        }
    }
});
