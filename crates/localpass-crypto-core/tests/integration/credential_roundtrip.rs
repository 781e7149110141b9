//! Account creation → login → recovery, as the store drives it.

use localpass_crypto_core::credential::{answers_match, hash_password, verify_password};
use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField, EnvelopeKey};

fn envelope() -> CipherEnvelope {
    CipherEnvelope::new(EnvelopeKey::new(&[0x21; 24]).expect("AES-192 key"))
}

#[test]
fn register_login_recover_reset() {
    let env = envelope();

    // Register.
    let cred = hash_password("first master").expect("hash");
    let answer1 = env.encrypt_str("Springfield");
    let answer2 = env.encrypt_str("rex");

    // Columns come back from storage as nullable strings.
    let stored1 = EncryptedField::from_columns(Some(answer1.iv), Some(answer1.content));
    let stored2 = EncryptedField::from_columns(Some(answer2.iv), Some(answer2.content));

    // Login.
    assert!(verify_password("first master", &cred.password_salt, &cred.password_hash));
    assert!(!verify_password("first-master", &cred.password_salt, &cred.password_hash));

    // Recovery: both answers must match.
    assert!(answers_match(&env, Some(&stored1), " springfield "));
    assert!(answers_match(&env, Some(&stored2), "REX"));
    assert!(!answers_match(&env, Some(&stored2), "max"));

    // Reset gives a new salt and the old password stops working.
    let reset = hash_password("second master").expect("hash");
    assert_ne!(reset.password_salt, cred.password_salt);
    assert!(verify_password("second master", &reset.password_salt, &reset.password_hash));
    assert!(!verify_password("first master", &reset.password_salt, &reset.password_hash));
}

#[test]
fn null_answer_columns_never_match() {
    let env = envelope();
    let stored = EncryptedField::from_columns(None, None);
    assert!(stored.is_blank());
    assert!(!answers_match(&env, Some(&stored), ""));
}
