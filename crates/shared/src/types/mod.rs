//! Common types used across the workspace.

pub mod amount;
pub mod id;

pub use amount::{Tolerance, positive_part};
pub use id::*;
