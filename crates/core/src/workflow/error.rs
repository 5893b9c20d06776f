//! Workflow error types for journal entry lifecycle management.
//!
//! These errors never escape the engine as `Err`: they are turned into a
//! failed [`TransitionOutcome`](super::types::TransitionOutcome) and the
//! entry keeps its status.

use thiserror::Error;

use grandlivre_shared::types::EntryId;

use crate::workflow::types::{EntryAction, EntryStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Attempted an action not allowed from the current status.
    #[error("Cannot {action} an entry in status {from}")]
    InvalidTransition {
        /// Requested action.
        action: EntryAction,
        /// The current status.
        from: EntryStatus,
    },

    /// Rejection requires a non-empty comment.
    #[error("A comment is required to reject an entry")]
    RejectionCommentRequired,

    /// Attempted to modify a posted entry.
    #[error("Cannot modify posted entry")]
    CannotModifyPosted,

    /// Attempted to modify a cancelled entry.
    #[error("Cannot modify cancelled entry")]
    CannotModifyCancelled,

    /// The entry carries an external lock.
    #[error("Entry is locked")]
    EntryLocked,

    /// Entry not found.
    #[error("Entry {0} not found")]
    EntryNotFound(EntryId),

    /// The status changed between read and write.
    #[error("Entry status changed concurrently: expected {expected}, found {actual}")]
    StatusConflict {
        /// Status the transition was computed from.
        expected: EntryStatus,
        /// Status found at write time.
        actual: EntryStatus,
    },
}

impl WorkflowError {
    /// Returns the HTTP-equivalent status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::RejectionCommentRequired
            | Self::CannotModifyPosted
            | Self::CannotModifyCancelled
            | Self::EntryLocked => 400,

            Self::EntryNotFound(_) => 404,

            Self::StatusConflict { .. } => 409,
        }
    }

    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::RejectionCommentRequired => "REJECTION_COMMENT_REQUIRED",
            Self::CannotModifyPosted => "CANNOT_MODIFY_POSTED",
            Self::CannotModifyCancelled => "CANNOT_MODIFY_CANCELLED",
            Self::EntryLocked => "ENTRY_LOCKED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::StatusConflict { .. } => "STATUS_CONFLICT",
        }
    }
}
