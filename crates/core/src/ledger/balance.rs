//! Per-account balance records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::{AccountId, Tolerance, positive_part};

use crate::accounts::{AccountRegistry, AccountType};

/// Balance of one account over a reporting period.
///
/// All amounts are raw debit-minus-credit figures; `closing` always equals
/// `opening + period_debit - period_credit`. Use [`BalanceRecord::normal_balance`]
/// for the figure signed by the account's normal side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Class digit.
    pub class: u8,
    /// Account type.
    pub account_type: AccountType,
    /// Balance carried in from before the period.
    pub opening: Decimal,
    /// Debits booked within the period.
    pub period_debit: Decimal,
    /// Credits booked within the period.
    pub period_credit: Decimal,
    /// Balance at period end.
    pub closing: Decimal,
}

impl BalanceRecord {
    /// Closing balance signed by the account's normal side.
    #[must_use]
    pub fn normal_balance(&self) -> Decimal {
        self.account_type
            .normal_side()
            .balance_change(self.closing, Decimal::ZERO)
    }

    /// Returns true if anything was booked within the period.
    #[must_use]
    pub fn has_movement(&self) -> bool {
        !self.period_debit.is_zero() || !self.period_credit.is_zero()
    }

    /// Returns true if the closing balance is zero within tolerance.
    #[must_use]
    pub fn is_zero(&self, tolerance: Tolerance) -> bool {
        tolerance.is_zero(self.closing)
    }

    /// Debit column of a trial balance: `max(closing, 0)`.
    #[must_use]
    pub fn debit_balance(&self) -> Decimal {
        positive_part(self.closing)
    }

    /// Credit column of a trial balance: `max(-closing, 0)`.
    #[must_use]
    pub fn credit_balance(&self) -> Decimal {
        positive_part(-self.closing)
    }
}

/// Running totals for one account while scanning lines.
#[derive(Debug, Clone)]
pub(crate) struct BalanceAccumulator {
    pub(crate) account_id: AccountId,
    pub(crate) account_number: String,
    pub(crate) account_name: String,
    debit_before: Decimal,
    credit_before: Decimal,
    debit_through: Decimal,
    credit_through: Decimal,
}

impl BalanceAccumulator {
    pub(crate) fn new(account_id: AccountId, account_number: String, account_name: String) -> Self {
        Self {
            account_id,
            account_number,
            account_name,
            debit_before: Decimal::ZERO,
            credit_before: Decimal::ZERO,
            debit_through: Decimal::ZERO,
            credit_through: Decimal::ZERO,
        }
    }

    /// Adds a line dated before the period start.
    ///
    /// Such a line is also "through" the period end, so it counts on both sides.
    pub(crate) fn add_before(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_before += debit;
        self.credit_before += credit;
        self.add_through(debit, credit);
    }

    /// Adds a line dated on or before the period end.
    pub(crate) fn add_through(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_through += debit;
        self.credit_through += credit;
    }

    pub(crate) fn finish(self) -> BalanceRecord {
        let classification = AccountRegistry::classify(&self.account_number);
        let opening = self.debit_before - self.credit_before;
        let period_debit = self.debit_through - self.debit_before;
        let period_credit = self.credit_through - self.credit_before;

        BalanceRecord {
            account_id: self.account_id,
            account_number: self.account_number,
            account_name: self.account_name,
            class: classification.class,
            account_type: classification.account_type,
            opening,
            period_debit,
            period_credit,
            closing: opening + period_debit - period_credit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn accumulator(number: &str) -> BalanceAccumulator {
        BalanceAccumulator::new(AccountId::new(), number.to_string(), "Test".to_string())
    }

    #[test]
    fn test_opening_and_period_split() {
        let mut acc = accumulator("512000");
        acc.add_before(dec!(1000), dec!(200));
        acc.add_through(dec!(300), dec!(50));

        let record = acc.finish();
        assert_eq!(record.opening, dec!(800));
        assert_eq!(record.period_debit, dec!(300));
        assert_eq!(record.period_credit, dec!(50));
        assert_eq!(record.closing, dec!(1050));
        assert_eq!(record.account_type, AccountType::Asset);
    }

    #[test]
    fn test_normal_balance_for_credit_accounts() {
        let mut acc = accumulator("707000");
        acc.add_through(Decimal::ZERO, dec!(1200));

        let record = acc.finish();
        assert_eq!(record.closing, dec!(-1200));
        assert_eq!(record.normal_balance(), dec!(1200));
        assert_eq!(record.debit_balance(), Decimal::ZERO);
        assert_eq!(record.credit_balance(), dec!(1200));
    }

    #[test]
    fn test_movement_and_zero() {
        let mut acc = accumulator("401000");
        acc.add_before(dec!(10), dec!(10));
        let record = acc.finish();
        assert!(!record.has_movement());
        assert!(record.is_zero(Tolerance::CENT));
    }
}
