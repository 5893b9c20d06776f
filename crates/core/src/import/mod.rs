//! FEC import: reading, parsing and planning.
//!
//! Everything here is pure. Writing the plan to a store (journals, then
//! accounts, then entries) is done by the engine's reconciler.
//!
//! # Modules
//!
//! - `fec` - Delimited file reader
//! - `parse` - Amount and date parsing
//! - `journals` - Journal type and name inference
//! - `plan` - Grouping rows into entries
//! - `types` - Rows and outcomes
//! - `error` - Reader errors

pub mod error;
pub mod fec;
pub mod journals;
pub mod parse;
pub mod plan;
pub mod types;

pub use error::FecError;
pub use fec::{detect_delimiter, parse_fec, read_fec};
pub use journals::infer_journal;
pub use parse::{parse_amount, parse_date};
pub use plan::{AccountSpec, DEFAULT_JOURNAL_CODE, EntryGroup, ImportPlan, JournalSpec, PlannedLine};
pub use types::{
    CreatedIds, FecRow, ImportCounts, ImportOutcome, ImportRowError, PhaseSummary, RowOutcome,
    RowStatus,
};
