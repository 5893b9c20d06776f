//! Chart of accounts classification.
//!
//! Account numbers follow the class-digit convention shared by the French
//! PCG and SYSCOHADA: the leading digit (1-8) decides where the account
//! lands in the statements and which side its balance is normally on.
//!
//! # Modules
//!
//! - `types` - Account, account type and normal side
//! - `registry` - Pure classification rules

pub mod registry;
pub mod types;

#[cfg(test)]
mod registry_props;

pub use registry::AccountRegistry;
pub use types::{Account, AccountClassification, AccountType, NormalSide};
