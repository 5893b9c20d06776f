//! Journal entry workflow management.
//!
//! This module implements the entry lifecycle state machine:
//! draft → review → validated → posted, with rejection back to draft.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (EntryStatus, EntryAction, Transition)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{EntryAction, EntryStatus, Transition, TransitionOutcome, WorkflowEvent};
