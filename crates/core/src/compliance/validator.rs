//! Compliance validator.

use chrono::{DateTime, Utc};
use grandlivre_shared::types::Tolerance;

use super::condition::DisplayCondition;
use super::fields::check_field;
use super::rules::BusinessRules;
use super::schema::{FormSchema, FormSection};
use super::score::ScorePolicy;
use super::snapshot::DataSnapshot;
use super::standards::{IfrsCheck, PcgCheck, StandardCheck, SyscohadaCheck};
use super::types::{AccountingStandard, Finding, Severity, ValidationResult};

/// Walks a schema, its business rules and standard checks over a data snapshot.
///
/// Constructed explicitly and passed around; holds no global state.
pub struct ComplianceValidator {
    checks: Vec<Box<dyn StandardCheck>>,
    score: ScorePolicy,
    tolerance: Tolerance,
}

impl std::fmt::Debug for ComplianceValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceValidator")
            .field(
                "checks",
                &self.checks.iter().map(|c| c.standard()).collect::<Vec<_>>(),
            )
            .field("score", &self.score)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl Default for ComplianceValidator {
    fn default() -> Self {
        Self::with_default_checks(Tolerance::default(), ScorePolicy::default())
    }
}

impl ComplianceValidator {
    /// Creates a validator without standard checks.
    #[must_use]
    pub fn new(tolerance: Tolerance, score: ScorePolicy) -> Self {
        Self {
            checks: Vec::new(),
            score,
            tolerance,
        }
    }

    /// Creates a validator with the PCG, SYSCOHADA and IFRS checks registered.
    #[must_use]
    pub fn with_default_checks(tolerance: Tolerance, score: ScorePolicy) -> Self {
        Self::new(tolerance, score)
            .with_check(Box::new(PcgCheck))
            .with_check(Box::new(SyscohadaCheck::new(tolerance)))
            .with_check(Box::new(IfrsCheck))
    }

    /// Registers an additional standard check.
    #[must_use]
    pub fn with_check(mut self, check: Box<dyn StandardCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Validates `data` against `schema`, `rules` and the checks for `standard`.
    ///
    /// # Arguments
    ///
    /// * `schema` - Form schema (sections, fields, display conditions)
    /// * `rules` - Business rules of the document type
    /// * `data` - Company data snapshot
    /// * `standard` - Declared accounting standard
    ///
    /// # Returns
    ///
    /// Findings in discovery order (schema, rules, standard), validity and score.
    #[must_use]
    pub fn validate(
        &self,
        schema: &FormSchema,
        rules: &BusinessRules,
        data: &DataSnapshot,
        standard: AccountingStandard,
    ) -> ValidationResult {
        self.validate_at(schema, rules, data, standard, Utc::now())
    }

    /// Same as [`ComplianceValidator::validate`] with an explicit timestamp.
    #[must_use]
    pub fn validate_at(
        &self,
        schema: &FormSchema,
        rules: &BusinessRules,
        data: &DataSnapshot,
        standard: AccountingStandard,
        checked_at: DateTime<Utc>,
    ) -> ValidationResult {
        let mut findings = Vec::new();

        visit_sections(&schema.sections, data, &mut findings);
        rules.apply(data, self.tolerance, &mut findings);
        for check in self.checks.iter().filter(|c| c.standard() == standard) {
            check.check(data, &mut findings);
        }

        ValidationResult {
            is_valid: !findings.iter().any(|f| f.severity == Severity::Error),
            compliance_score: self.score.score(&findings),
            errors: findings,
            checked_at,
        }
    }
}

fn visit_sections(sections: &[FormSection], data: &DataSnapshot, findings: &mut Vec<Finding>) {
    for section in sections {
        if !DisplayCondition::all_hold(&section.conditions, data) {
            continue;
        }
        for field in &section.fields {
            if DisplayCondition::all_hold(&field.conditions, data) {
                check_field(field, data, findings);
            }
        }
        visit_sections(&section.subsections, data, findings);
    }
}
