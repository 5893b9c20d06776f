//! Storage seam.
//!
//! The engine only talks to storage through [`LedgerStore`]. Every write is
//! scoped by company and idempotent on natural keys (journal code, account
//! number, journal + entry number), so a failed import can be re-run.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use grandlivre_core::accounts::Account;
use grandlivre_core::ledger::{EntryLine, Journal, JournalEntry, LedgerLine};
use grandlivre_core::workflow::{EntryStatus, WorkflowEvent};
use grandlivre_shared::AppError;
use grandlivre_shared::types::{AccountId, CompanyId, EntryId, JournalId};

/// Result type alias for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A compare-and-swap on the entry status lost against another writer.
    #[error("Entry status changed concurrently: expected {expected}, found {actual}")]
    StatusConflict {
        /// Status the caller read.
        expected: EntryStatus,
        /// Status found at write time.
        actual: EntryStatus,
    },

    /// A referenced row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A write would break a natural-key uniqueness rule.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The store refused one write (size limit, constraint) but is up.
    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "STORAGE_UNAVAILABLE",
            Self::StatusConflict { .. } => "STATUS_CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Rejected(_) => "WRITE_REJECTED",
        }
    }

    /// Returns true if the store itself is down, as opposed to a
    /// rejected write.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) | StoreError::Rejected(msg) => Self::Storage(msg),
            StoreError::StatusConflict { .. } | StoreError::Duplicate(_) => {
                Self::Conflict(err.to_string())
            }
            StoreError::NotFound(msg) => Self::NotFound(msg),
        }
    }
}

/// Narrow repository interface used by the engine.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lists the company's accounts, active or not.
    async fn list_accounts(&self, company_id: CompanyId) -> StoreResult<Vec<Account>>;

    /// Inserts accounts; an account whose number already exists for the
    /// company is left untouched.
    async fn insert_accounts(&self, accounts: Vec<Account>) -> StoreResult<()>;

    /// Flips an account's active flag.
    async fn set_account_active(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        active: bool,
    ) -> StoreResult<Account>;

    /// Lists the company's journals.
    async fn list_journals(&self, company_id: CompanyId) -> StoreResult<Vec<Journal>>;

    /// Inserts journals; a journal whose code already exists for the
    /// company is left untouched.
    async fn insert_journals(&self, journals: Vec<Journal>) -> StoreResult<()>;

    /// Looks an entry up by journal and entry number.
    async fn find_entry(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        entry_number: &str,
    ) -> StoreResult<Option<JournalEntry>>;

    /// Fetches an entry header.
    async fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<JournalEntry>>;

    /// Lists the company's entry headers.
    async fn list_entries(&self, company_id: CompanyId) -> StoreResult<Vec<JournalEntry>>;

    /// Inserts an entry header.
    ///
    /// # Errors
    ///
    /// `StoreError::Duplicate` if the journal already holds the entry number.
    async fn insert_entry(&self, entry: JournalEntry) -> StoreResult<()>;

    /// Inserts an entry header together with its lines. Either both are
    /// stored or neither is.
    ///
    /// # Errors
    ///
    /// `StoreError::Duplicate` if the journal already holds the entry number.
    async fn insert_entry_with_lines(
        &self,
        entry: JournalEntry,
        lines: Vec<EntryLine>,
    ) -> StoreResult<()>;

    /// Appends lines to existing entries.
    async fn insert_lines(&self, lines: Vec<EntryLine>) -> StoreResult<()>;

    /// Lines of one entry.
    async fn entry_lines(&self, entry_id: EntryId) -> StoreResult<Vec<EntryLine>>;

    /// Replaces an entry header and all its lines, provided its status is
    /// still `expected`.
    async fn replace_entry(
        &self,
        entry: JournalEntry,
        lines: Vec<EntryLine>,
        expected: EntryStatus,
    ) -> StoreResult<()>;

    /// Moves an entry from `expected` to `next`, setting the lock flag when
    /// `lock` is true. Returns the updated header.
    ///
    /// # Errors
    ///
    /// `StoreError::StatusConflict` if the stored status is not `expected`.
    async fn compare_and_set_status(
        &self,
        entry_id: EntryId,
        expected: EntryStatus,
        next: EntryStatus,
        lock: bool,
    ) -> StoreResult<JournalEntry>;

    /// Appends an audit event.
    async fn record_event(&self, event: WorkflowEvent) -> StoreResult<()>;

    /// Audit events of one entry, oldest first.
    async fn entry_events(&self, entry_id: EntryId) -> StoreResult<Vec<WorkflowEvent>>;

    /// Lines of entries in one of `statuses`, dated on or before `until`,
    /// joined with their account number and name.
    async fn ledger_lines(
        &self,
        company_id: CompanyId,
        statuses: &[EntryStatus],
        until: NaiveDate,
    ) -> StoreResult<Vec<LedgerLine>>;
}
