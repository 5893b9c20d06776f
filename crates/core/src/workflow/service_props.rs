//! Property-based tests for WorkflowService.

use proptest::prelude::*;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{EntryAction, EntryStatus};

/// Strategy for generating random EntryStatus values.
fn arb_status() -> impl Strategy<Value = EntryStatus> {
    prop_oneof![
        Just(EntryStatus::Draft),
        Just(EntryStatus::Review),
        Just(EntryStatus::Validated),
        Just(EntryStatus::Posted),
        Just(EntryStatus::Cancelled),
    ]
}

/// Strategy for generating random EntryAction values.
fn arb_action() -> impl Strategy<Value = EntryAction> {
    prop_oneof![
        Just(EntryAction::Submit),
        Just(EntryAction::Approve),
        Just(EntryAction::Reject),
        Just(EntryAction::Post),
    ]
}

/// Strategy for generating non-empty comments.
fn arb_comment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

/// Strategy for generating blank comments.
fn arb_blank_comment() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[ \t]{0,5}".prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Available actions match the transition table
    // =========================================================================

    /// An action succeeds exactly when it is listed as available.
    #[test]
    fn prop_apply_agrees_with_available_actions(
        status in arb_status(),
        locked in any::<bool>(),
        action in arb_action(),
        comment in arb_comment(),
    ) {
        let available = WorkflowService::available_actions(status, locked);
        let result = WorkflowService::apply(action, status, locked, Some(comment));
        prop_assert_eq!(result.is_ok(), available.contains(&action));
    }

    /// A successful transition always lands on the action's target status.
    #[test]
    fn prop_transition_reaches_target(
        status in arb_status(),
        action in arb_action(),
        comment in arb_comment(),
    ) {
        if let Ok(transition) = WorkflowService::apply(action, status, false, Some(comment)) {
            prop_assert_eq!(transition.from, status);
            prop_assert_eq!(transition.to, action.target_status());
            prop_assert!(WorkflowService::is_valid_transition(transition.from, transition.to));
        }
    }

    // =========================================================================
    // Terminal states
    // =========================================================================

    /// Posted and cancelled entries expose no action, locked or not.
    #[test]
    fn prop_terminal_states_have_no_actions(locked in any::<bool>()) {
        prop_assert!(WorkflowService::available_actions(EntryStatus::Posted, locked).is_empty());
        prop_assert!(WorkflowService::available_actions(EntryStatus::Cancelled, locked).is_empty());
    }

    /// Only post locks an entry.
    #[test]
    fn prop_only_post_locks(
        status in arb_status(),
        action in arb_action(),
        comment in arb_comment(),
    ) {
        if let Ok(transition) = WorkflowService::apply(action, status, false, Some(comment)) {
            prop_assert_eq!(transition.lock, action == EntryAction::Post);
        }
    }

    // =========================================================================
    // Reject comment
    // =========================================================================

    /// Reject with a blank comment always fails with RejectionCommentRequired.
    #[test]
    fn prop_reject_requires_comment(
        status in arb_status(),
        locked in any::<bool>(),
        comment in arb_blank_comment(),
    ) {
        let result = WorkflowService::reject(status, locked, comment);
        prop_assert_eq!(result.unwrap_err(), WorkflowError::RejectionCommentRequired);
    }
}
