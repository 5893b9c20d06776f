//! Amount comparison with a fixed rounding tolerance.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every balance check in the engine goes through [`Tolerance`] so the
//! 0.01 rule is expressed in one place.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum absolute difference under which two amounts are considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(Decimal);

impl Tolerance {
    /// The default tolerance of one cent.
    pub const CENT: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Creates a tolerance; negative values are taken as their magnitude.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value.abs())
    }

    /// Returns the raw tolerance value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if `|left - right| < tolerance`.
    ///
    /// A difference outside the `Decimal` range is never equal.
    #[must_use]
    pub fn approx_eq(self, left: Decimal, right: Decimal) -> bool {
        left.checked_sub(right).is_some_and(|diff| diff.abs() < self.0)
    }

    /// Returns true if `|amount| < tolerance`.
    #[must_use]
    pub fn is_zero(self, amount: Decimal) -> bool {
        amount.abs() < self.0
    }

    /// Returns true if `|left - right| > tolerance` (strictly outside).
    ///
    /// A difference outside the `Decimal` range always exceeds.
    #[must_use]
    pub fn exceeds(self, left: Decimal, right: Decimal) -> bool {
        left.checked_sub(right).is_none_or(|diff| diff.abs() > self.0)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::CENT
    }
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns `max(amount, 0)`.
#[must_use]
pub fn positive_part(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}
