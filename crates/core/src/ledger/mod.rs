//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Journals, entries and lines
//! - Entry content validation (balanced, one-sided lines)
//! - Period balance aggregation per account
//!
//! # Modules
//!
//! - `types` - Journal, entry, line and period types
//! - `balance` - Per-account balance records
//! - `aggregator` - Single-pass opening/period/closing computation
//! - `validation` - Entry content rules
//! - `error` - Ledger error types

pub mod aggregator;
pub mod balance;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::{AggregateOptions, LedgerAggregator};
pub use balance::BalanceRecord;
pub use error::LedgerError;
pub use types::{
    EntryDraft, EntryLine, Journal, JournalEntry, JournalType, LedgerLine, LineDraft, ReportPeriod,
};
pub use validation::{EntryTotals, validate_amounts};
