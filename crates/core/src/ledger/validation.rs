//! Business rule validation for entry content.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::Tolerance;

use super::error::LedgerError;

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit.
    pub debit: Decimal,
    /// Total credit.
    pub credit: Decimal,
}

impl EntryTotals {
    /// Totals of an entry with no lines.
    pub const ZERO: Self = Self {
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
    };

    /// Adds one line, or `None` if a total leaves the `Decimal` range.
    #[must_use]
    pub fn checked_add(self, debit: Decimal, credit: Decimal) -> Option<Self> {
        Some(Self {
            debit: self.debit.checked_add(debit)?,
            credit: self.credit.checked_add(credit)?,
        })
    }

    /// Sums `(debit, credit)` pairs, or `None` on overflow.
    #[must_use]
    pub fn from_amounts(amounts: impl IntoIterator<Item = (Decimal, Decimal)>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, (debit, credit)| acc.checked_add(debit, credit))
    }

    /// Returns true if debits equal credits within tolerance.
    #[must_use]
    pub fn is_balanced(&self, tolerance: Tolerance) -> bool {
        !tolerance.exceeds(self.debit, self.credit)
    }
}

/// Validates the `(debit, credit)` amounts of an entry's lines.
///
/// Rules: at least two lines; no negative amount; each line is either a
/// debit or a credit; totals stay within the `Decimal` range; debits equal
/// credits within `tolerance`.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_amounts(
    amounts: &[(Decimal, Decimal)],
    tolerance: Tolerance,
) -> Result<EntryTotals, LedgerError> {
    if amounts.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    for (line, (debit, credit)) in amounts.iter().enumerate() {
        if *debit < Decimal::ZERO || *credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line });
        }
        if debit.is_zero() == credit.is_zero() {
            return Err(LedgerError::InvalidLine { line });
        }
    }

    let totals =
        EntryTotals::from_amounts(amounts.iter().copied()).ok_or(LedgerError::AmountOverflow)?;
    if !totals.is_balanced(tolerance) {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
