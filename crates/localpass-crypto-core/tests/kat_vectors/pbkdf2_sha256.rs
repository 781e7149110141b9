//! RFC 7914 §11: PBKDF2-HMAC-SHA256 Known-Answer Test vectors.

use super::hex;
use localpass_crypto_core::kdf::{derive, Pbkdf2Params};

/// P = "passwd", S = "salt", c = 1, dkLen = 64.
///
/// The salt is 4 bytes, below our 16-byte floor, so this vector goes
/// straight to the `pbkdf2` crate with the same hash we instantiate.
#[test]
fn rfc7914_passwd_salt_c1() {
    let expected = hex(concat!(
        "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc",
        "49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783",
    ));
    let mut out = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(b"passwd", b"salt", 1, &mut out);
    assert_eq!(out.as_slice(), expected.as_slice());
}

/// Our `derive` agrees with the raw crate at the credential tier.
#[test]
fn derive_matches_raw_crate_at_credential_tier() {
    let salt = b"0123456789abcdef0123456789abcdef";
    let params = Pbkdf2Params {
        iterations: 1_000,
        output_len: 64,
    };
    let ours = derive(b"master password", salt, &params).expect("derive");
    let mut raw = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(b"master password", salt, 1_000, &mut raw);
    assert_eq!(ours.expose(), raw.as_slice());
}
