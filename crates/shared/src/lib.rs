//! Shared types, errors, and configuration for Grandlivre.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Amount tolerance used by every balance comparison
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EngineConfig, LogConfig};
pub use error::{AppError, AppResult};
