mod aes_cbc;
mod pbkdf2_sha256;

/// Decode a lowercase hex literal.
pub fn hex(s: &str) -> Vec<u8> {
    data_encoding::HEXLOWER
        .decode(s.as_bytes())
        .expect("test vector should be valid hex")
}
