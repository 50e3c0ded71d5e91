//! Risk scoring data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Coordinates;

/// Discrete risk bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Score below 30.
    Low,
    /// Score 30 to 59.
    Medium,
    /// Score 60 and above.
    High,
}

impl RiskLevel {
    /// Buckets a clamped risk score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score < 30 {
            Self::Low
        } else if score < 60 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Returns the lowercase string form used in storage and responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// The slice of a prior session the scoring engine needs.
///
/// History is ordered newest-first; geographic anomaly checks compare the
/// new login against the first element only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionObservation {
    /// When the prior session was created.
    pub created_at: DateTime<Utc>,
    /// Country of the prior session, if resolved.
    pub country: Option<String>,
    /// Coordinates of the prior session, if resolved.
    pub coordinates: Option<Coordinates>,
    /// Device type string of the prior session.
    pub device_type: String,
}

/// Output of the risk scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Additive risk score, clamped to [0, 100].
    pub score: u8,
    /// Discrete risk bucket.
    pub level: RiskLevel,
    /// Human-readable factors that contributed to the score.
    pub factors: Vec<String>,
    /// Whether the login should require step-up verification.
    pub requires_verification: bool,
    /// Advisory recommendations; nothing in this crate enforces them.
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, RiskLevel::Low)]
    #[case(29, RiskLevel::Low)]
    #[case(30, RiskLevel::Medium)]
    #[case(59, RiskLevel::Medium)]
    #[case(60, RiskLevel::High)]
    #[case(100, RiskLevel::High)]
    fn test_level_thresholds(#[case] score: u8, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_score(score), expected);
    }
}
