//! Ledger engine for Grandlivre.
//!
//! This crate connects the pure logic of `grandlivre-core` to storage:
//! - The [`LedgerStore`] seam and an in-memory implementation
//! - The async [`ImportReconciler`] (journals, accounts, entries)
//! - The [`LedgerEngine`] facade exposing the public operations
//!
//! # Modules
//!
//! - `store` - Storage trait and store errors
//! - `memory` - In-memory store with failure injection
//! - `reconciler` - FEC import reconciliation
//! - `engine` - Statements, validation, workflow and entry editing
//! - `error` - Engine and import errors

pub mod engine;
pub mod error;
pub mod memory;
pub mod reconciler;
pub mod store;

pub use engine::LedgerEngine;
pub use error::{EngineError, ImportError, ImportPhase};
pub use memory::{MemoryStore, StoreOp};
pub use reconciler::ImportReconciler;
pub use store::{LedgerStore, StoreError, StoreResult};
