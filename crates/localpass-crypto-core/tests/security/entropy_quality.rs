//! Entropy quality of the random values we persist: envelope IVs,
//! credential salts, backup salts.
//!
//! Shannon entropy of uniform bytes approaches 8.0 bits/byte as the sample
//! grows. Thresholds are set well below the expected value for each sample
//! size so only degenerate output (zeros, repeats, counters) trips them.
//!
//! | Sample size | Expected entropy | Threshold |
//! |-------------|-----------------|-----------|
//! | 16 bytes    | ~3.8            | 3.0       |
//! | 64 KB       | ~7.997          | 7.99      |

use std::collections::HashSet;

use data_encoding::HEXLOWER;
use localpass_crypto_core::credential::hash_password;
use localpass_crypto_core::envelope::{CipherEnvelope, EnvelopeKey};
use localpass_crypto_core::memory::SecretBytes;

/// Shannon entropy of a byte slice (bits per byte).
#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// 4096 envelope IVs concatenated = 64 KB of IV material.
#[test]
fn envelope_ivs_64kb_entropy() {
    let env = CipherEnvelope::new(EnvelopeKey::new(&[7u8; 32]).expect("key"));
    let mut all = Vec::with_capacity(65536);
    let mut seen = HashSet::new();
    for _ in 0..4096 {
        let field = env.encrypt_str("");
        assert!(seen.insert(field.iv.clone()), "IV repeated");
        all.extend(HEXLOWER.decode(field.iv.as_bytes()).expect("hex iv"));
    }
    let entropy = shannon_entropy(&all);
    assert!(entropy > 7.99, "IV entropy too low: {entropy:.4} (expected > 7.99)");
}

#[test]
fn credential_salt_entropy() {
    let rec = hash_password("pw").expect("hash");
    let salt = HEXLOWER.decode(rec.password_salt.as_bytes()).expect("hex salt");
    assert_eq!(salt.len(), 16);
    let entropy = shannon_entropy(&salt);
    assert!(entropy > 3.0, "salt entropy too low: {entropy:.4} (expected > 3.0)");
}

#[test]
fn random_secret_bytes_are_not_degenerate() {
    let a = SecretBytes::<16>::random().expect("CSPRNG should succeed");
    let b = SecretBytes::<16>::random().expect("CSPRNG should succeed");
    assert_ne!(a.expose(), b.expose());
    assert_ne!(a.expose(), &[0u8; 16]);
}
