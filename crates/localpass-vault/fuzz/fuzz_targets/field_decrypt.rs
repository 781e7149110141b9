//! Fuzz target for the field envelope decrypt path.
//!
//! Splits the input into an iv and a content string and decrypts them.
//! Must never panic; bad input yields `Absent` or `Failed`.
//!
//! # Usage
//!
//! ```sh
//! cd crates/localpass-vault
//! cargo +nightly fuzz run field_decrypt -- -max_len=1024
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField, EnvelopeKey};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let (iv, content) = s.split_once('|').unwrap_or((s, ""));
    let Ok(key) = EnvelopeKey::from_passphrase("fuzz-envelope-16") else {
        return;
    };
    let envelope = CipherEnvelope::new(key);
    let field = EncryptedField {
        iv: iv.to_string(),
        content: content.to_string(),
    };
    let _ = envelope.decrypt_outcome(Some(&field));
    let _ = envelope.decrypt(Some(&field));
});
