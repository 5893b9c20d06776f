//! Core ledger and compliance logic for Grandlivre.
//!
//! This crate contains pure business logic with ZERO storage or IO
//! dependencies. Everything here works on already-fetched data and may run
//! on any number of threads.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts classification
//! - `ledger` - Journals, entries and per-account balance aggregation
//! - `reports` - Trial balance, balance sheet and income statement
//! - `compliance` - Schema-driven validation and scoring
//! - `workflow` - Entry lifecycle state machine
//! - `import` - FEC reading and import planning

pub mod accounts;
pub mod compliance;
pub mod import;
pub mod ledger;
pub mod reports;
pub mod workflow;
