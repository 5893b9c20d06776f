//! Workflow domain types for journal entry lifecycle management.
//!
//! This module defines the entry statuses, the actions that move an entry
//! between them and the outcome reported back to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use grandlivre_shared::types::EntryId;

/// Entry status in the approval workflow.
///
/// The valid transitions are:
/// - Draft → Review (submit)
/// - Review → Validated (approve)
/// - Review → Draft (reject)
/// - Validated → Posted (post)
/// - Validated → Draft (reject)
///
/// Posted and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry has been submitted for review.
    Review,
    /// Entry has been approved and is ready for posting.
    Validated,
    /// Entry has been posted to the ledger (immutable).
    Posted,
    /// Entry has been cancelled (immutable).
    Cancelled,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Validated => "validated",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "review" => Some(Self::Review),
            "validated" => Some(Self::Validated),
            "posted" => Some(Self::Posted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the entry content can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the entry is terminal and immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Posted | Self::Cancelled)
    }

    /// Returns true if entries in this status feed the statements.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        matches!(self, Self::Validated | Self::Posted)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An action a user can request on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAction {
    /// Draft → Review.
    Submit,
    /// Review → Validated.
    Approve,
    /// Review or Validated → Draft.
    Reject,
    /// Validated → Posted.
    Post,
}

impl EntryAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Post => "post",
        }
    }

    /// Returns the status the entry ends up in.
    #[must_use]
    pub fn target_status(self) -> EntryStatus {
        match self {
            Self::Submit => EntryStatus::Review,
            Self::Approve => EntryStatus::Validated,
            Self::Reject => EntryStatus::Draft,
            Self::Post => EntryStatus::Posted,
        }
    }

    /// Returns true if the action needs a non-empty comment.
    #[must_use]
    pub fn requires_comment(self) -> bool {
        matches!(self, Self::Reject)
    }

    /// Returns true if the action locks the entry.
    #[must_use]
    pub fn locks_entry(self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for EntryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated state change, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Action performed.
    pub action: EntryAction,
    /// Status before the action.
    pub from: EntryStatus,
    /// Status after the action.
    pub to: EntryStatus,
    /// Comment supplied with the action.
    pub comment: Option<String>,
    /// Whether the entry becomes locked.
    pub lock: bool,
    /// When the transition was computed.
    pub at: DateTime<Utc>,
}

impl Transition {
    /// Human-readable confirmation of the transition.
    #[must_use]
    pub fn message(&self) -> String {
        match self.action {
            EntryAction::Submit => "Entry submitted for review".to_string(),
            EntryAction::Approve => "Entry validated".to_string(),
            EntryAction::Reject => match &self.comment {
                Some(comment) => format!("Entry rejected and returned to draft: {comment}"),
                None => "Entry rejected and returned to draft".to_string(),
            },
            EntryAction::Post => "Entry posted and locked".to_string(),
        }
    }
}

/// Audit record of a transition applied to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Entry concerned.
    pub entry_id: EntryId,
    /// Action performed.
    pub action: EntryAction,
    /// Status before.
    pub from: EntryStatus,
    /// Status after.
    pub to: EntryStatus,
    /// Comment supplied.
    pub comment: Option<String>,
    /// When it happened.
    pub at: DateTime<Utc>,
}

impl WorkflowEvent {
    /// Builds the audit record of `transition` on `entry_id`.
    #[must_use]
    pub fn from_transition(entry_id: EntryId, transition: &Transition) -> Self {
        Self {
            entry_id,
            action: transition.action,
            from: transition.from,
            to: transition.to,
            comment: transition.comment.clone(),
            at: transition.at,
        }
    }
}

/// Result of a transition request, as reported to callers.
///
/// A failed outcome never changes the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    /// Whether the transition happened.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Status after the call.
    pub status: EntryStatus,
    /// Error code when the transition failed.
    pub code: Option<String>,
}

impl TransitionOutcome {
    /// Outcome of a persisted transition.
    #[must_use]
    pub fn succeeded(transition: &Transition) -> Self {
        Self {
            success: true,
            message: transition.message(),
            status: transition.to,
            code: None,
        }
    }

    /// Outcome of a refused transition; `status` is the unchanged status.
    #[must_use]
    pub fn failed(status: EntryStatus, code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            status,
            code: Some(code.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(EntryStatus::Draft.as_str(), "draft");
        assert_eq!(EntryStatus::Review.as_str(), "review");
        assert_eq!(EntryStatus::Validated.as_str(), "validated");
        assert_eq!(EntryStatus::Posted.as_str(), "posted");
        assert_eq!(EntryStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(EntryStatus::parse("draft"), Some(EntryStatus::Draft));
        assert_eq!(EntryStatus::parse("REVIEW"), Some(EntryStatus::Review));
        assert_eq!(EntryStatus::parse(" Validated "), Some(EntryStatus::Validated));
        assert_eq!(EntryStatus::parse("posted"), Some(EntryStatus::Posted));
        assert_eq!(EntryStatus::parse("cancelled"), Some(EntryStatus::Cancelled));
        assert_eq!(EntryStatus::parse("pending"), None);
    }

    #[test]
    fn test_status_flags() {
        assert!(EntryStatus::Draft.is_editable());
        assert!(!EntryStatus::Review.is_editable());
        assert!(EntryStatus::Posted.is_immutable());
        assert!(EntryStatus::Cancelled.is_immutable());
        assert!(!EntryStatus::Validated.is_immutable());
        assert!(EntryStatus::Validated.is_reportable());
        assert!(EntryStatus::Posted.is_reportable());
        assert!(!EntryStatus::Review.is_reportable());
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(EntryAction::Submit.target_status(), EntryStatus::Review);
        assert_eq!(EntryAction::Approve.target_status(), EntryStatus::Validated);
        assert_eq!(EntryAction::Reject.target_status(), EntryStatus::Draft);
        assert_eq!(EntryAction::Post.target_status(), EntryStatus::Posted);
        assert!(EntryAction::Reject.requires_comment());
        assert!(!EntryAction::Approve.requires_comment());
        assert!(EntryAction::Post.locks_entry());
    }

    #[test]
    fn test_reject_message_includes_comment() {
        let transition = Transition {
            action: EntryAction::Reject,
            from: EntryStatus::Review,
            to: EntryStatus::Draft,
            comment: Some("insufficient support".to_string()),
            lock: false,
            at: Utc::now(),
        };
        let outcome = TransitionOutcome::succeeded(&transition);
        assert!(outcome.success);
        assert_eq!(outcome.status, EntryStatus::Draft);
        assert!(outcome.message.contains("rejected"));
        assert!(outcome.message.contains("insufficient support"));
    }
}
