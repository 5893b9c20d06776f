//! Ledger domain types: journals, entries, lines and report periods.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use grandlivre_shared::types::{AccountId, CompanyId, EntryId, EntryLineId, JournalId};

use crate::workflow::EntryStatus;

/// Journal category, derived from the journal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalType {
    /// Opening balances (à-nouveaux).
    Opening,
    /// Sales.
    Sale,
    /// Purchases.
    Purchase,
    /// Bank movements.
    Bank,
    /// Cash register.
    Cash,
    /// Miscellaneous operations.
    Misc,
    /// Reversals (extournes).
    Reversal,
    /// Unrecognized code.
    Other,
}

impl JournalType {
    /// Returns the string representation of the journal type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::Misc => "misc",
            Self::Reversal => "reversal",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A journal, unique per company by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Journal ID.
    pub id: JournalId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Journal code (unique per company).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Journal category.
    pub journal_type: JournalType,
    /// Inactive journals are kept for history.
    pub is_active: bool,
}

/// Journal entry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry ID.
    pub id: EntryId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Journal the entry belongs to.
    pub journal_id: JournalId,
    /// Entry number, unique within a journal.
    pub entry_number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Supporting document reference.
    pub reference: Option<String>,
    /// Workflow status.
    pub status: EntryStatus,
    /// External lock; set when posted, may also be set by a period close.
    pub locked: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Returns true if the entry content may still be changed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !self.locked && self.status.is_editable()
    }
}

/// One debit or credit line of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    /// Line ID.
    pub id: EntryLineId,
    /// Parent entry.
    pub entry_id: EntryId,
    /// Account moved by this line.
    pub account_id: AccountId,
    /// Debit amount (>= 0).
    pub debit: Decimal,
    /// Credit amount (>= 0).
    pub credit: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional line label.
    pub label: Option<String>,
}

/// Input for creating or replacing the content of an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Target journal.
    pub journal_id: JournalId,
    /// Entry number, unique within the journal.
    pub entry_number: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Supporting document reference.
    pub reference: Option<String>,
    /// Lines.
    pub lines: Vec<LineDraft>,
}

/// Input line of an [`EntryDraft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDraft {
    /// Account moved by this line.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line label.
    pub label: Option<String>,
}

/// A line joined with its entry date and account, as read for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Account moved.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Inclusive reporting period. A missing start means "since the first entry".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day of the period.
    pub start: Option<NaiveDate>,
    /// Last day of the period.
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// Creates a period.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true if `date` falls before the period start.
    #[must_use]
    pub fn is_before(&self, date: NaiveDate) -> bool {
        self.start.is_some_and(|start| date < start)
    }

    /// Returns true if `date` is on or before the period end.
    #[must_use]
    pub fn is_through(&self, date: NaiveDate) -> bool {
        date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_bounds() {
        let period = ReportPeriod::new(Some(date(2024, 1, 1)), date(2024, 12, 31));
        assert!(period.is_before(date(2023, 12, 31)));
        assert!(!period.is_before(date(2024, 1, 1)));
        assert!(period.is_through(date(2024, 12, 31)));
        assert!(!period.is_through(date(2025, 1, 1)));
    }

    #[test]
    fn test_open_start_has_nothing_before() {
        let period = ReportPeriod::new(None, date(2024, 6, 30));
        assert!(!period.is_before(date(1990, 1, 1)));
    }

    #[test]
    fn test_journal_type_serializes_lowercase() {
        let json = serde_json::to_string(&JournalType::Reversal).unwrap();
        assert_eq!(json, "\"reversal\"");
    }
}
