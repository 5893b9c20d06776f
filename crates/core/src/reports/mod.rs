//! Financial statement generation.
//!
//! This module provides pure business logic for building statements from
//! aggregated balances:
//! - Trial Balance
//! - Balance Sheet
//! - Income Statement

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::StatementBuilder;
pub use types::*;
