//! Compliance result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks validity and costs the most score.
    Error,
    /// Reported and scored, but the document stays valid.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    /// Returns the string representation of the severity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Field (or rule) the finding is about.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Stable code, e.g. `REQUIRED_FIELD`.
    pub code: String,
    /// Severity.
    pub severity: Severity,
}

impl Finding {
    /// Creates an error finding.
    pub fn error(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self::new(field, code, message, Severity::Error)
    }

    /// Creates a warning finding.
    pub fn warning(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self::new(field, code, message, Severity::Warning)
    }

    /// Creates an info finding.
    pub fn info(field: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self::new(field, code, message, Severity::Info)
    }

    /// Creates a finding with an explicit severity.
    pub fn new(
        field: impl Into<String>,
        code: &str,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
            severity,
        }
    }
}

/// Outcome of a compliance validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no finding has `Error` severity.
    pub is_valid: bool,
    /// Score in 0..=100.
    pub compliance_score: u8,
    /// All findings, errors first in discovery order.
    pub errors: Vec<Finding>,
    /// When the validation ran.
    pub checked_at: DateTime<Utc>,
}

impl ValidationResult {
    /// Number of findings with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.errors.iter().filter(|f| f.severity == severity).count()
    }

    /// Returns true if a finding with `code` exists.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|f| f.code == code)
    }
}

/// Accounting standard a document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountingStandard {
    /// French Plan Comptable Général.
    #[serde(alias = "FR", alias = "PCG_FR")]
    Pcg,
    /// SYSCOHADA / OHADA.
    #[serde(alias = "OHADA")]
    Syscohada,
    /// IFRS.
    Ifrs,
    /// Any other declared standard; no extra checks.
    #[serde(other)]
    Other,
}

impl AccountingStandard {
    /// Parses a standard, case-insensitively. Unknown names map to `Other`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PCG" | "FR" | "PCG_FR" => Self::Pcg,
            "SYSCOHADA" | "OHADA" => Self::Syscohada,
            "IFRS" => Self::Ifrs,
            _ => Self::Other,
        }
    }
}
