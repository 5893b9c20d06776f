//! Engine error types.
//!
//! Only failures the caller has to act on are errors here. Validation
//! findings, import row errors and refused workflow transitions are values.

use thiserror::Error;

use grandlivre_core::ledger::LedgerError;
use grandlivre_core::reports::ReportError;
use grandlivre_core::workflow::{EntryStatus, WorkflowError};
use grandlivre_shared::AppError;
use grandlivre_shared::types::{EntryId, JournalId};

use crate::store::StoreError;

/// Errors returned by [`LedgerEngine`](crate::LedgerEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Entry content breaks the double-entry rules.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Invalid report request.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Entry lifecycle rule violated.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Entry can only be edited while in draft.
    #[error("Entry in status {0} cannot be edited")]
    EntryNotEditable(EntryStatus),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// Journal already holds an entry with this number.
    #[error("Entry {number} already exists in journal {journal}")]
    DuplicateEntry {
        /// Journal code.
        journal: String,
        /// Entry number.
        number: String,
    },
}

impl EngineError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::EntryNotEditable(_) => "ENTRY_NOT_EDITABLE",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
        }
    }

    pub(crate) fn entry_not_found(entry_id: EntryId) -> Self {
        Self::Workflow(WorkflowError::EntryNotFound(entry_id))
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(e) => e.into(),
            EngineError::Ledger(e) => Self::Validation(e.to_string()),
            EngineError::Report(e) => Self::Validation(e.to_string()),
            EngineError::Workflow(e) => match e.status_code() {
                404 => Self::NotFound(e.to_string()),
                409 => Self::Conflict(e.to_string()),
                _ => Self::BusinessRule(e.to_string()),
            },
            EngineError::EntryNotEditable(_) => Self::BusinessRule(err.to_string()),
            EngineError::JournalNotFound(_) => Self::NotFound(err.to_string()),
            EngineError::DuplicateEntry { .. } => Self::Conflict(err.to_string()),
        }
    }
}

/// Import phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportPhase {
    /// Journal creation.
    Journals,
    /// Account creation.
    Accounts,
    /// Entry and line creation.
    Entries,
}

impl ImportPhase {
    /// Returns the lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journals => "journals",
            Self::Accounts => "accounts",
            Self::Entries => "entries",
        }
    }
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fatal import errors. Phases committed before the failure stay committed.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The store went away during a phase.
    #[error("Storage failure during {phase} phase: {source}")]
    Storage {
        /// Phase that was aborted.
        phase: ImportPhase,
        /// Underlying store error.
        source: StoreError,
    },

    /// `engine.import_status` is not an entry status.
    #[error("Invalid import status '{0}'")]
    InvalidStatus(String),
}

impl ImportError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Storage { .. } => "IMPORT_STORAGE_FAILURE",
            Self::InvalidStatus(_) => "INVALID_IMPORT_STATUS",
        }
    }

    /// Phase that was aborted, if any.
    #[must_use]
    pub fn phase(&self) -> Option<ImportPhase> {
        match self {
            Self::Storage { phase, .. } => Some(*phase),
            Self::InvalidStatus(_) => None,
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Storage { .. } => Self::Storage(err.to_string()),
            ImportError::InvalidStatus(_) => Self::Config(err.to_string()),
        }
    }
}
