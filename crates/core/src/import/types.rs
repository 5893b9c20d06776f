//! Import rows and outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;

use grandlivre_shared::types::{AccountId, EntryId, JournalId};

/// One raw row of a FEC-like export. Values are kept as text; parsing
/// happens during planning so bad cells become row errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FecRow {
    /// `JournalCode`
    pub journal_code: String,
    /// `JournalLib`
    pub journal_lib: String,
    /// `EcritureNum`
    pub entry_number: String,
    /// `EcritureDate` (`YYYYMMDD` or ISO)
    pub entry_date: String,
    /// `CompteNum`
    pub account_number: String,
    /// `CompteLib`
    pub account_lib: String,
    /// `PieceRef`
    pub piece_ref: String,
    /// `EcritureLib`
    pub entry_lib: String,
    /// `Debit`
    pub debit: String,
    /// `Credit`
    pub credit: String,
    /// `Idevise`, when present.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Status of one input row after import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Line created.
    Success,
    /// Line created, with a remark.
    Warning,
    /// Row not imported.
    Error,
    /// Entry already existed; nothing written.
    Skipped,
}

impl RowStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one input row, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOutcome {
    /// Zero-based index in the input.
    pub row: usize,
    /// Status.
    pub status: RowStatus,
    /// Journal code of the row.
    pub journal_code: String,
    /// Entry number of the row.
    pub entry_number: String,
    /// Explanation for warnings, errors and skips.
    pub message: Option<String>,
}

/// A non-fatal import error tied to a row (or to a chunk of rows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    /// Zero-based input row; for chunk failures, the first row of the chunk.
    pub row: usize,
    /// Stable code, e.g. `UNKNOWN_ACCOUNT`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ImportRowError {
    /// Creates a row error.
    pub fn new(row: usize, code: &str, message: impl Into<String>) -> Self {
        Self {
            row,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Result of one import phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    /// Entities created by this run.
    pub created: usize,
    /// Entities found already present.
    pub existing: usize,
    /// Non-fatal errors.
    pub errors: Vec<ImportRowError>,
}

/// Row counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    /// Input rows.
    pub total: usize,
    /// Rows with status success.
    pub success: usize,
    /// Rows with status warning.
    pub warning: usize,
    /// Rows with status error.
    pub error: usize,
    /// Rows with status skipped.
    pub skipped: usize,
}

impl ImportCounts {
    /// Tallies row outcomes.
    #[must_use]
    pub fn from_rows(rows: &[RowOutcome]) -> Self {
        rows.iter().fold(
            Self {
                total: rows.len(),
                ..Self::default()
            },
            |mut counts, row| {
                match row.status {
                    RowStatus::Success => counts.success += 1,
                    RowStatus::Warning => counts.warning += 1,
                    RowStatus::Error => counts.error += 1,
                    RowStatus::Skipped => counts.skipped += 1,
                }
                counts
            },
        )
    }

    /// Rows that produced an entry line.
    #[must_use]
    pub const fn imported(&self) -> usize {
        self.success + self.warning
    }
}

/// Ids of everything the import created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIds {
    /// Journals created, keyed by code.
    pub journals: Vec<(String, JournalId)>,
    /// Accounts created, keyed by number.
    pub accounts: Vec<(String, AccountId)>,
    /// Entries created.
    pub entries: Vec<EntryId>,
}

/// Full result of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Journals phase.
    pub journals: PhaseSummary,
    /// Accounts phase.
    pub accounts: PhaseSummary,
    /// Entries phase (`created`/`existing` count entries).
    pub entries: PhaseSummary,
    /// Entry lines written.
    pub lines_created: usize,
    /// One outcome per input row, in input order.
    pub rows: Vec<RowOutcome>,
    /// Row counts by status.
    pub counts: ImportCounts,
    /// Created ids.
    pub created_ids: CreatedIds,
    /// True when the run was cancelled before every group was processed.
    pub cancelled: bool,
}

impl ImportOutcome {
    /// All non-fatal errors across phases.
    pub fn errors(&self) -> impl Iterator<Item = &ImportRowError> {
        self.journals
            .errors
            .iter()
            .chain(&self.accounts.errors)
            .chain(&self.entries.errors)
    }
}
