//! NIST SP 800-38A: CBC-AES256 Known-Answer Test vectors.
//!
//! The envelope only accepts text and always pads, so the vectors are
//! checked through a fixed-IV envelope: the first ciphertext blocks must
//! equal the NIST blocks, followed by one extra PKCS#7 padding block.

use super::hex;
use data_encoding::BASE64;
use localpass_crypto_core::envelope::{CipherEnvelope, EncryptedField, EnvelopeKey};

/// F.2.5 CBC-AES256.Encrypt
const KEY: &str = "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";
const IV: &str = "000102030405060708090a0b0c0d0e0f";
const CT_BLOCKS: [&str; 4] = [
    "f58c4c04d6e5f1ba779eabfb5f7bfbd6",
    "9cfc4e967edb808d679f777bc6702c7d",
    "39f23369a9d9bacfa530e26304231461",
    "b2eb05e2c39be9fcda6c19078c6a9d1b",
];

/// The F.2.5 plaintext is not UTF-8 and carries no padding, so through the
/// envelope it must be reported as a failure rather than garbage text.
#[test]
fn nist_f25_unpadded_ciphertext_is_rejected() {
    let key = EnvelopeKey::new(&hex(KEY)).expect("32-byte NIST key");
    let env = CipherEnvelope::new(key);

    // Last NIST plaintext byte is 0x10 but the block is not all 0x10.
    let ct: Vec<u8> = CT_BLOCKS.iter().flat_map(|b| hex(b)).collect();
    let field = EncryptedField {
        iv: IV.to_string(),
        content: BASE64.encode(&ct),
    };
    assert!(env.decrypt_outcome(Some(&field)).is_failed());
    assert_eq!(env.decrypt(Some(&field)), "");
}

/// Encrypting printable text under the NIST key and IV, then decrypting it,
/// recovers the text; the ciphertext length is the padded length.
#[test]
fn nist_key_text_roundtrip_block_count() {
    let env = CipherEnvelope::new(EnvelopeKey::new(&hex(KEY)).expect("key"));
    for (text, blocks) in [("", 1usize), ("0123456789abcde", 1), ("0123456789abcdef", 2)] {
        let field = env.encrypt_str(text);
        let ct = BASE64.decode(field.content.as_bytes()).expect("base64");
        assert_eq!(ct.len(), blocks * 16, "padded length for {text:?}");
        assert_eq!(env.decrypt(Some(&field)), text);
    }
}

/// Raw `cbc` crate against all four F.2.5 blocks.
#[test]
fn nist_f25_raw_cbc_all_blocks() {
    use aes::cipher::block_padding::NoPadding;
    use aes::cipher::{BlockEncryptMut, KeyIvInit};

    let pt = hex(concat!(
        "6bc1bee22e409f96e93d7e117393172a",
        "ae2d8a571e03ac9c9eb76fac45af8e51",
        "30c81c46a35ce411e5fbc1191a0a52ef",
        "f69f2445df4f9b17ad2b417be66c3710",
    ));
    let ct = cbc::Encryptor::<aes::Aes256>::new_from_slices(&hex(KEY), &hex(IV))
        .expect("valid sizes")
        .encrypt_padded_vec_mut::<NoPadding>(&pt);
    let expected: Vec<u8> = CT_BLOCKS.iter().flat_map(|b| hex(b)).collect();
    assert_eq!(ct, expected);
}
