//! Password strength scoring and the login health report.
//!
//! Reports carry only scores, counts and service names; passwords never
//! leave this module.

use serde::Serialize;

use crate::logins::LoginEntry;

// ---------------------------------------------------------------------------
// Password strength
// ---------------------------------------------------------------------------

/// Scores at or below this count as weak in [`HealthReport`].
pub const WEAK_THRESHOLD: u8 = 2;

/// Highest possible strength score.
pub const MAX_SCORE: u8 = 5;

/// Strength tier, one per score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    VeryWeak,
    Weak,
    Moderate,
    Good,
    Strong,
    VeryStrong,
}

impl Strength {
    /// Human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }

    const fn from_score(score: u8) -> Self {
        match score {
            0 => Self::VeryWeak,
            1 => Self::Weak,
            2 => Self::Moderate,
            3 => Self::Good,
            4 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

/// Score in `0..=5` plus its label. The label is empty for an empty password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthScore {
    pub score: u8,
    pub label: &'static str,
}

/// Score a password: one point each for length ≥ 8, length ≥ 12, mixed
/// ASCII case, an ASCII digit, and a character outside `[A-Za-z0-9]`.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn evaluate_password_strength(password: &str) -> StrengthScore {
    if password.is_empty() {
        return StrengthScore { score: 0, label: "" };
    }

    let len = password.chars().count();
    let mut score: u8 = 0;

    if len >= 8 {
        score += 1;
    }
    if len >= 12 {
        score += 1;
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        score += 1;
    }

    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }

    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    StrengthScore {
        score,
        label: Strength::from_score(score).as_str(),
    }
}

// ---------------------------------------------------------------------------
// Health report
// ---------------------------------------------------------------------------

/// Placeholder service name when no login qualifies.
pub const NOT_AVAILABLE: &str = "N/A";

/// Aggregate view over a user's logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub total: usize,
    /// Logins scoring ≤ [`WEAK_THRESHOLD`] or with no password at all.
    pub weak: usize,
    /// `round(average score / 5 * 100)`, empty passwords counting as 0.
    pub security_score: u8,
    pub strongest: String,
    pub weakest: String,
}

impl Default for HealthReport {
    fn default() -> Self {
        Self {
            total: 0,
            weak: 0,
            security_score: 0,
            strongest: NOT_AVAILABLE.to_string(),
            weakest: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Build the health report for a list of logins.
///
/// Ties keep the first login seen, in list order.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn analyze_logins(logins: &[LoginEntry]) -> HealthReport {
    if logins.is_empty() {
        return HealthReport::default();
    }

    let mut weak = 0usize;
    let mut total_score = 0usize;
    let mut strongest: Option<(&str, u8)> = None;
    let mut weakest: Option<(&str, u8)> = None;

    for login in logins {
        let score = if login.password.is_empty() {
            weak += 1;
            0
        } else {
            let s = evaluate_password_strength(&login.password).score;
            total_score += usize::from(s);
            if s <= WEAK_THRESHOLD {
                weak += 1;
            }
            if strongest.map_or(true, |(_, best)| s > best) {
                strongest = Some((&login.service, s));
            }
            s
        };
        if weakest.map_or(true, |(_, worst)| score < worst) {
            weakest = Some((&login.service, score));
        }
    }

    // Integer round-half-up of total / (5 * n) * 100.
    let n = logins.len();
    let denom = usize::from(MAX_SCORE) * n;
    let rounded = (total_score * 200 + denom) / (denom * 2);

    HealthReport {
        total: n,
        weak,
        security_score: u8::try_from(rounded).unwrap_or(100),
        strongest: strongest.map_or(NOT_AVAILABLE, |(s, _)| s).to_string(),
        weakest: weakest.map_or(NOT_AVAILABLE, |(s, _)| s).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
