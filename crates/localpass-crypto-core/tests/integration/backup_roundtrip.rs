//! Typed payload through encrypt → file text → decrypt.

use localpass_crypto_core::backup::{decrypt_backup, encrypt_backup, BackupContainer};
use localpass_crypto_core::CryptoError;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    user_id: i64,
    entries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cards: Option<Vec<String>>,
}

#[test]
fn typed_roundtrip_through_file_text() {
    let snap = Snapshot {
        user_id: 42,
        entries: vec!["mail".into(), "bank ünïcode".into()],
        cards: None,
    };
    let text = encrypt_backup(&snap, "export pass")
        .expect("encrypt")
        .to_json()
        .expect("to_json");

    // Absent section is not present anywhere, not even encrypted as empty.
    let value: serde_json::Value = serde_json::from_str(&text).expect("file is JSON");
    let keys: Vec<&str> = value.as_object().expect("object").keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3);
    for key in ["salt", "iv", "content"] {
        assert!(keys.contains(&key), "missing {key}");
    }

    let container = BackupContainer::from_json(&text).expect("from_json");
    let back: Snapshot = decrypt_backup(&container, "export pass").expect("decrypt");
    assert_eq!(back, snap);

    let raw: serde_json::Value = decrypt_backup(&container, "export pass").expect("decrypt raw");
    assert!(raw.get("cards").is_none());
}

#[test]
fn wrong_passphrase_and_corruption_look_the_same() {
    let container = encrypt_backup(&vec![1, 2, 3], "right").expect("encrypt");

    let wrong = decrypt_backup::<Vec<i32>>(&container, "wrong").expect_err("wrong passphrase");

    let mut corrupt = container.clone();
    corrupt.iv = "ff".repeat(15);
    let corrupted = decrypt_backup::<Vec<i32>>(&corrupt, "right").expect_err("bad iv");

    assert!(matches!(wrong, CryptoError::BackupDecryption));
    assert!(matches!(corrupted, CryptoError::BackupDecryption));
    assert_eq!(wrong.to_string(), corrupted.to_string());
}
