//! Property-based tests for LedgerAggregator.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use grandlivre_shared::types::{AccountId, Tolerance};

use super::aggregator::{AggregateOptions, LedgerAggregator};
use super::types::{LedgerLine, ReportPeriod};

const NUMBERS: [&str; 6] = ["101000", "401000", "411000", "512000", "607000", "707000"];

/// Strategy for generating amounts with two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating dates within 2023-2024.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..730).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

/// Strategy for generating ledger lines over a fixed set of accounts.
fn arb_lines(ids: Vec<AccountId>) -> impl Strategy<Value = Vec<LedgerLine>> {
    prop::collection::vec(
        (0usize..NUMBERS.len(), arb_date(), arb_amount(), arb_amount()),
        0..60,
    )
    .prop_map(move |raw| {
        raw.into_iter()
            .map(|(idx, date, debit, credit)| LedgerLine {
                account_id: ids[idx],
                account_number: NUMBERS[idx].to_string(),
                account_name: format!("Compte {}", NUMBERS[idx]),
                date,
                debit,
                credit,
            })
            .collect()
    })
}

fn account_ids() -> Vec<AccountId> {
    NUMBERS.iter().map(|_| AccountId::new()).collect()
}

fn period() -> ReportPeriod {
    ReportPeriod::new(
        NaiveDate::from_ymd_opt(2024, 1, 1),
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Closing balance identity
    // =========================================================================

    /// closing = opening + period_debit - period_credit for every record.
    #[test]
    fn prop_closing_identity(lines in arb_lines(account_ids())) {
        let records = LedgerAggregator::aggregate(&[], &lines, period(), AggregateOptions::default());
        for record in records {
            let expected = record.opening + record.period_debit - record.period_credit;
            prop_assert!(Tolerance::CENT.approx_eq(record.closing, expected));
        }
    }

    // =========================================================================
    // Order independence
    // =========================================================================

    /// Reversing the input does not change the result.
    #[test]
    fn prop_order_independent(lines in arb_lines(account_ids())) {
        let forward = LedgerAggregator::aggregate(&[], &lines, period(), AggregateOptions::default());
        let mut reversed_lines = lines.clone();
        reversed_lines.reverse();
        let reversed = LedgerAggregator::aggregate(&[], &reversed_lines, period(), AggregateOptions::default());
        prop_assert_eq!(forward, reversed);
    }

    // =========================================================================
    // Conservation
    // =========================================================================

    /// Period debits across accounts equal the debits of lines inside the period.
    #[test]
    fn prop_period_debits_conserved(lines in arb_lines(account_ids())) {
        let p = period();
        let expected: Decimal = lines
            .iter()
            .filter(|l| p.is_through(l.date) && !p.is_before(l.date))
            .map(|l| l.debit)
            .sum();
        let records = LedgerAggregator::aggregate(&[], &lines, p, AggregateOptions::default());
        let actual: Decimal = records.iter().map(|r| r.period_debit).sum();
        prop_assert_eq!(actual, expected);
    }
}
