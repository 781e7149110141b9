//! Timing side-channel check for the comparison behind password and
//! security-answer verification.
//!
//! Simplified dudect-style analysis: time `constant_time_eq` on a matching
//! input (class A) and on an input that differs in its first byte (class B),
//! then compute Welch's t-statistic. |t| > 4.5 would indicate an early exit
//! at >99.999% confidence.
//!
//! Scheduler noise can produce false positives on a loaded machine, so the
//! measurement itself is opt-in (`cargo test -- --ignored`).

use std::time::Instant;

use localpass_crypto_core::credential::constant_time_eq;

/// Number of timing samples per class.
const SAMPLES: usize = 10_000;

/// Welch's t-test threshold.
const T_THRESHOLD: f64 = 4.5;

/// Compared input length: the hex length of a stored password hash.
const INPUT_LEN: usize = 128;

#[inline(never)]
fn black_box_eq(a: &[u8], b: &[u8]) -> bool {
    std::hint::black_box(constant_time_eq(std::hint::black_box(a), std::hint::black_box(b)))
}

/// `t = (mean_a - mean_b) / sqrt(var_a/n_a + var_b/n_b)`
#[allow(clippy::cast_precision_loss)]
fn welch_t_statistic(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;

    let mean_a: f64 = a.iter().sum::<f64>() / n_a;
    let mean_b: f64 = b.iter().sum::<f64>() / n_b;

    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum::<f64>() / (n_a - 1.0);
    let var_b: f64 = b.iter().map(|x| (x - mean_b).powi(2)).sum::<f64>() / (n_b - 1.0);

    let denominator = (var_a / n_a + var_b / n_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (mean_a - mean_b) / denominator
}

#[test]
#[ignore = "statistical timing measurement; run on a quiet machine"]
fn constant_time_eq_no_timing_leak() {
    let stored = vec![b'a'; INPUT_LEN];
    let matching = stored.clone();
    let mut early_mismatch = stored.clone();
    early_mismatch[0] = b'b';

    for _ in 0..100 {
        black_box_eq(&stored, &matching);
        black_box_eq(&stored, &early_mismatch);
    }

    let mut times_a = Vec::with_capacity(SAMPLES);
    let mut times_b = Vec::with_capacity(SAMPLES);

    for _ in 0..SAMPLES {
        let start = Instant::now();
        let _ = black_box_eq(&stored, &matching);
        let elapsed_a = start.elapsed().as_nanos();

        let start = Instant::now();
        let _ = black_box_eq(&stored, &early_mismatch);
        let elapsed_b = start.elapsed().as_nanos();

        #[allow(clippy::cast_precision_loss)]
        {
            times_a.push(elapsed_a as f64);
            times_b.push(elapsed_b as f64);
        }
    }

    let abs_t = welch_t_statistic(&times_a, &times_b).abs();
    eprintln!("constant_time_eq: |t| = {abs_t:.2} (threshold: {T_THRESHOLD}), samples = {SAMPLES}");
    assert!(
        abs_t < T_THRESHOLD,
        "timing difference detected: |t| = {abs_t:.2} exceeds {T_THRESHOLD}"
    );
}

#[test]
fn welch_t_test_identical_distributions() {
    let a = vec![1.0; 100];
    let b = vec![1.0; 100];
    let t = welch_t_statistic(&a, &b);
    assert!(t.abs() < 0.001, "identical distributions should yield t ≈ 0, got {t}");
}

#[test]
fn welch_t_test_different_distributions() {
    let a: Vec<f64> = (0..1000).map(|i| 100.0 + f64::from(i % 3)).collect();
    let b: Vec<f64> = (0..1000).map(|i| 200.0 + f64::from(i % 3)).collect();
    let t = welch_t_statistic(&a, &b);
    assert!(t.abs() > 100.0, "clearly different distributions should yield |t| >> 4.5, got {t:.2}");
}
