//! Workflow service for journal entry state transitions.
//!
//! This module implements the state machine that moves an entry from
//! draft to posted. Everything here is pure: the returned [`Transition`]
//! still has to be persisted with a compare-and-swap on `from`.

use chrono::Utc;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{EntryAction, EntryStatus, Transition};

/// Stateless service for managing entry workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Returns the actions currently available on an entry.
    ///
    /// A pure function of `(status, locked)`: nothing is available on a
    /// locked, posted or cancelled entry.
    #[must_use]
    pub fn available_actions(status: EntryStatus, locked: bool) -> Vec<EntryAction> {
        if locked {
            return Vec::new();
        }

        match status {
            EntryStatus::Draft => vec![EntryAction::Submit],
            EntryStatus::Review => vec![EntryAction::Approve, EntryAction::Reject],
            EntryStatus::Validated => vec![EntryAction::Post, EntryAction::Reject],
            EntryStatus::Posted | EntryStatus::Cancelled => Vec::new(),
        }
    }

    /// Submit a draft entry for review.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the entry
    /// * `locked` - The entry's lock flag
    /// * `comment` - Optional comment
    ///
    /// # Returns
    /// * `Ok(Transition)` to `Review` if the entry is an unlocked draft
    /// * `Err(WorkflowError)` otherwise
    pub fn submit(
        current_status: EntryStatus,
        locked: bool,
        comment: Option<String>,
    ) -> Result<Transition, WorkflowError> {
        Self::apply(EntryAction::Submit, current_status, locked, comment)
    }

    /// Approve an entry under review.
    ///
    /// # Returns
    /// * `Ok(Transition)` to `Validated` if the entry is in review
    /// * `Err(WorkflowError)` otherwise
    pub fn approve(
        current_status: EntryStatus,
        locked: bool,
        comment: Option<String>,
    ) -> Result<Transition, WorkflowError> {
        Self::apply(EntryAction::Approve, current_status, locked, comment)
    }

    /// Reject an entry in review or validated back to draft.
    ///
    /// # Returns
    /// * `Ok(Transition)` to `Draft`
    /// * `Err(WorkflowError::RejectionCommentRequired)` if the comment is empty
    /// * `Err(WorkflowError::InvalidTransition)` from any other status
    pub fn reject(
        current_status: EntryStatus,
        locked: bool,
        comment: Option<String>,
    ) -> Result<Transition, WorkflowError> {
        Self::apply(EntryAction::Reject, current_status, locked, comment)
    }

    /// Post a validated entry. Irreversible: the entry becomes locked.
    ///
    /// # Returns
    /// * `Ok(Transition)` to `Posted` with `lock = true`
    /// * `Err(WorkflowError)` otherwise
    pub fn post(current_status: EntryStatus, locked: bool) -> Result<Transition, WorkflowError> {
        Self::apply(EntryAction::Post, current_status, locked, None)
    }

    /// Validates `action` against the current state and builds the transition.
    ///
    /// # Errors
    ///
    /// See [`WorkflowError`]; the checks run in this order: missing reject
    /// comment, terminal status, lock flag, transition table.
    pub fn apply(
        action: EntryAction,
        current_status: EntryStatus,
        locked: bool,
        comment: Option<String>,
    ) -> Result<Transition, WorkflowError> {
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if action.requires_comment() && comment.is_none() {
            return Err(WorkflowError::RejectionCommentRequired);
        }

        match current_status {
            EntryStatus::Posted => return Err(WorkflowError::CannotModifyPosted),
            EntryStatus::Cancelled => return Err(WorkflowError::CannotModifyCancelled),
            _ => {}
        }

        if locked {
            return Err(WorkflowError::EntryLocked);
        }

        let to = action.target_status();
        if !Self::is_valid_transition(current_status, to) {
            return Err(WorkflowError::InvalidTransition {
                action,
                from: current_status,
            });
        }

        Ok(Transition {
            action,
            from: current_status,
            to,
            comment,
            lock: action.locks_entry(),
            at: Utc::now(),
        })
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Review (submit)
    /// - Review → Validated (approve)
    /// - Review → Draft (reject)
    /// - Validated → Posted (post)
    /// - Validated → Draft (reject)
    #[must_use]
    pub fn is_valid_transition(from: EntryStatus, to: EntryStatus) -> bool {
        matches!(
            (from, to),
            (EntryStatus::Draft, EntryStatus::Review)
                | (
                    EntryStatus::Review,
                    EntryStatus::Validated | EntryStatus::Draft
                )
                | (EntryStatus::Validated, EntryStatus::Posted | EntryStatus::Draft)
        )
    }
}
