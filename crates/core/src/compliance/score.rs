//! Compliance scoring.

use serde::{Deserialize, Serialize};

use super::types::{Finding, Severity};

/// Penalty weights turning findings into a 0..=100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    /// Points lost per error.
    pub error_weight: u32,
    /// Points lost per warning.
    pub warning_weight: u32,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            error_weight: 20,
            warning_weight: 5,
        }
    }
}

impl ScorePolicy {
    /// `100 - min(100, errors * error_weight + warnings * warning_weight)`.
    ///
    /// Info findings never lower the score.
    #[must_use]
    pub fn score(&self, findings: &[Finding]) -> u8 {
        let penalty = findings.iter().fold(0u32, |acc, f| {
            let weight = match f.severity {
                Severity::Error => self.error_weight,
                Severity::Warning => self.warning_weight,
                Severity::Info => 0,
            };
            acc.saturating_add(weight)
        });
        // penalty is capped at 100 so the difference always fits
        u8::try_from(100 - penalty.min(100)).unwrap_or(0)
    }
}
