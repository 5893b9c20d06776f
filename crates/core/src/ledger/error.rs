//! Ledger error types.
//!
//! Raised when an interactively created or edited entry breaks the
//! double-entry rules, or references an unusable account.

use rust_decimal::Decimal;
use thiserror::Error;

use grandlivre_shared::types::AccountId;

/// Errors that can occur while validating entry content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// An entry needs at least two lines.
    #[error("Entry must have at least 2 lines")]
    InsufficientLines,

    /// A line amount is negative.
    #[error("Line {line}: amounts cannot be negative")]
    NegativeAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// A line carries both a debit and a credit, or neither.
    #[error("Line {line}: exactly one of debit or credit must be non-zero")]
    InvalidLine {
        /// Zero-based line index.
        line: usize,
    },

    /// Debits and credits differ by more than the tolerance.
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// Entry totals do not fit in a `Decimal`.
    #[error("Entry totals are out of range")]
    AmountOverflow,

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot receive new lines.
    #[error("Account {0} is inactive")]
    AccountInactive(String),
}

impl LedgerError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
        }
    }
}
