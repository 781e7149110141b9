//! Audit properties of the envelope, credential and backup formats.

use data_encoding::BASE64;
use localpass_crypto_core::backup::{decrypt_backup_value, encrypt_backup};
use localpass_crypto_core::credential::{hash_password, hash_with_salt, verify_password};
use localpass_crypto_core::envelope::{CipherEnvelope, EnvelopeKey};
use localpass_crypto_core::kdf::{derive, Pbkdf2Params};
use localpass_crypto_core::CryptoError;
use serde_json::json;

fn envelope() -> CipherEnvelope {
    CipherEnvelope::new(EnvelopeKey::from_passphrase("a-32-byte-long-super-secret-key!").expect("key"))
}

#[test]
fn envelope_content_does_not_contain_plaintext() {
    let env = envelope();
    let secret = "SUPERSECRETPASSWORDSUPERSECRETPASSWORD";
    let field = env.encrypt_str(secret);
    let raw = BASE64.decode(field.content.as_bytes()).expect("base64");
    assert!(!raw.windows(8).any(|w| secret.as_bytes().windows(8).any(|s| s == w)));
    assert!(!field.content.contains(secret));
}

#[test]
fn backup_content_does_not_contain_plaintext() {
    let container = encrypt_backup(&json!({"password": "hunter2hunter2"}), "pw").expect("encrypt");
    let raw = BASE64.decode(container.content.as_bytes()).expect("base64");
    assert!(!raw.windows(7).any(|w| w == b"hunter2"));
    assert!(!container.to_json().expect("json").contains("hunter2"));
}

#[test]
fn identical_blocks_encrypt_differently() {
    // CBC chaining: two equal plaintext blocks never give equal ciphertext blocks.
    let env = envelope();
    let field = env.encrypt_str(&"A".repeat(32));
    let raw = BASE64.decode(field.content.as_bytes()).expect("base64");
    assert_eq!(raw.len(), 48);
    assert_ne!(&raw[..16], &raw[16..32]);
}

#[test]
fn kdf_avalanche_effect_single_bit_change() {
    let params = Pbkdf2Params {
        iterations: 10,
        output_len: 32,
    };
    let salt = [0x11u8; 16];
    let a = derive(b"password", &salt, &params).expect("derive a");
    let b = derive(b"passwore", &salt, &params).expect("derive b");
    let differing_bits: u32 = a
        .expose()
        .iter()
        .zip(b.expose())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum();
    // 256 bits, expect ~128 to differ.
    assert!(
        (80..=176).contains(&differing_bits),
        "avalanche out of range: {differing_bits} bits differ"
    );
}

#[test]
fn credential_hash_is_case_sensitive_but_hex_is_not() {
    let rec = hash_password("Secret").expect("hash");
    assert!(!verify_password("secret", &rec.password_salt, &rec.password_hash));
    assert!(verify_password(
        "Secret",
        &rec.password_salt,
        &rec.password_hash.to_uppercase()
    ));
}

#[test]
fn credential_salt_changes_hash() {
    let a = hash_with_salt("pw", "00000000000000000000000000000000").expect("a");
    let b = hash_with_salt("pw", "00000000000000000000000000000001").expect("b");
    assert_ne!(a, b);
}

#[test]
fn secret_containers_debug_never_leaks_content() {
    let env = envelope();
    let debug = format!("{env:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("***"));
}

#[test]
fn truncated_backup_rejected_uniformly() {
    let mut container = encrypt_backup(&json!({"k": "v"}), "pw").expect("encrypt");
    let raw = BASE64.decode(container.content.as_bytes()).expect("base64");
    container.content = BASE64.encode(&raw[..raw.len() - 16]);
    assert!(matches!(
        decrypt_backup_value(&container, "pw"),
        Err(CryptoError::BackupDecryption)
    ));
}
