//! Schema-driven compliance validation.
//!
//! A document type is described by a [`FormSchema`] (sections, typed fields,
//! display conditions) and a [`BusinessRules`] block. The validator walks
//! both over a company's [`DataSnapshot`], then runs the checks registered
//! for the declared [`AccountingStandard`]. Findings are values, never
//! errors; the score is computed by an injected [`ScorePolicy`].
//!
//! # Modules
//!
//! - `schema` - Form sections and typed fields
//! - `condition` - Display conditions
//! - `fields` - Per-field checks
//! - `rules` - Required lists, balance checks, cross validations
//! - `expr` / `parser` - Restricted expression language
//! - `standards` - PCG, SYSCOHADA and IFRS checks
//! - `score` - Scoring policy
//! - `validator` - Orchestration

pub mod condition;
pub mod expr;
pub mod fields;
pub mod parser;
pub mod rules;
pub mod schema;
pub mod score;
pub mod snapshot;
pub mod standards;
pub mod types;
pub mod validator;

#[cfg(test)]
mod validator_props;

pub use condition::{ConditionOperator, DisplayCondition};
pub use expr::{ExprError, ExprValue, Expression};
pub use rules::{BalanceCheck, BusinessRules, CrossValidation};
pub use schema::{Bound, FieldKind, FieldOption, FormField, FormSchema, FormSection};
pub use score::ScorePolicy;
pub use snapshot::DataSnapshot;
pub use standards::{IfrsCheck, PcgCheck, StandardCheck, SyscohadaCheck};
pub use types::{AccountingStandard, Finding, Severity, ValidationResult};
pub use validator::ComplianceValidator;
