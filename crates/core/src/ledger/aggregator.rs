//! Period balance aggregation.
//!
//! One pass over the lines builds an account → accumulator map; the result
//! does not depend on line order. Lines dated after the period end are
//! ignored, lines before the start feed the opening balance.

use std::collections::HashMap;

use grandlivre_shared::types::{AccountId, Tolerance};

use super::balance::{BalanceAccumulator, BalanceRecord};
use super::types::{LedgerLine, ReportPeriod};
use crate::accounts::Account;

/// Options for [`LedgerAggregator::aggregate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Keep accounts with no movement and a zero closing balance,
    /// including chart accounts that have no lines at all.
    pub include_zero_balances: bool,
    /// Tolerance used to decide whether a closing balance is zero.
    pub tolerance: Tolerance,
}

/// Stateless balance aggregator.
pub struct LedgerAggregator;

impl LedgerAggregator {
    /// Computes opening, period and closing balances per account.
    ///
    /// # Arguments
    /// * `accounts` - The company's chart; only used to seed zero-balance rows
    /// * `lines` - Entry lines dated on or before the period end, in any order
    /// * `period` - Reporting period
    /// * `options` - Zero-balance handling and tolerance
    ///
    /// # Returns
    /// Balance records sorted by account number.
    #[must_use]
    pub fn aggregate(
        accounts: &[Account],
        lines: &[LedgerLine],
        period: ReportPeriod,
        options: AggregateOptions,
    ) -> Vec<BalanceRecord> {
        let mut by_account: HashMap<AccountId, BalanceAccumulator> =
            HashMap::with_capacity(accounts.len());

        if options.include_zero_balances {
            for account in accounts {
                by_account.insert(
                    account.id,
                    BalanceAccumulator::new(account.id, account.number.clone(), account.name.clone()),
                );
            }
        }

        for line in lines {
            if !period.is_through(line.date) {
                continue;
            }

            let accumulator = by_account.entry(line.account_id).or_insert_with(|| {
                BalanceAccumulator::new(
                    line.account_id,
                    line.account_number.clone(),
                    line.account_name.clone(),
                )
            });

            if period.is_before(line.date) {
                accumulator.add_before(line.debit, line.credit);
            } else {
                accumulator.add_through(line.debit, line.credit);
            }
        }

        let mut records: Vec<BalanceRecord> = by_account
            .into_values()
            .map(BalanceAccumulator::finish)
            .filter(|record| {
                options.include_zero_balances
                    || record.has_movement()
                    || !record.is_zero(options.tolerance)
            })
            .collect();

        records.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        records
    }
}
