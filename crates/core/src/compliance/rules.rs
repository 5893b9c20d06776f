//! Business-rule block: required/numeric/positive lists, balance checks and
//! cross-field validations.

use grandlivre_shared::types::Tolerance;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::expr::Expression;
use super::snapshot::{self, DataSnapshot};
use super::types::{Finding, Severity};

/// Business rules attached to a document type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRules {
    /// Fields that must be non-empty.
    #[serde(default)]
    pub required: Vec<String>,
    /// Fields that must be numeric when present.
    #[serde(default)]
    pub numeric: Vec<String>,
    /// Fields that must be zero or positive when present.
    #[serde(default)]
    pub positive: Vec<String>,
    /// Sum equalities.
    #[serde(default)]
    pub balance_checks: Vec<BalanceCheck>,
    /// Expression-based validations.
    #[serde(default)]
    pub cross_validations: Vec<CrossValidation>,
}

/// `Σ left == Σ right` within a tolerance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceCheck {
    /// Fields summed on the left.
    #[serde(default, alias = "left")]
    pub left_fields: Vec<String>,
    /// Fields summed on the right.
    #[serde(default, alias = "right")]
    pub right_fields: Vec<String>,
    /// Message on mismatch.
    #[serde(default)]
    pub message: Option<String>,
    /// Absolute tolerance; the validator default applies when absent.
    #[serde(default)]
    pub tolerance: Option<Decimal>,
}

/// A boolean expression that must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    /// Expression, e.g. `total_actif == total_passif`.
    pub condition: String,
    /// Message when the expression is false.
    pub message: String,
    /// Severity of the finding.
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

fn default_severity() -> Severity {
    Severity::Error
}

impl BusinessRules {
    /// Applies every rule, appending findings.
    ///
    /// `REQUIRED_FIELD` is not repeated for a field that already has one.
    pub fn apply(&self, data: &DataSnapshot, tolerance: Tolerance, findings: &mut Vec<Finding>) {
        for field in &self.required {
            let already_reported = findings
                .iter()
                .any(|f| f.code == "REQUIRED_FIELD" && &f.field == field);
            if !already_reported && data.is_empty(field) {
                findings.push(Finding::error(
                    field.as_str(),
                    "REQUIRED_FIELD",
                    format!("Field '{field}' is required"),
                ));
            }
        }

        for field in &self.numeric {
            if !data.is_empty(field) && data.number(field).is_none() {
                findings.push(Finding::error(
                    field.as_str(),
                    "INVALID_TYPE",
                    format!("Field '{field}' must be a number"),
                ));
            }
        }

        for field in &self.positive {
            if let Some(value) = data.number(field)
                && value < Decimal::ZERO
            {
                findings.push(Finding::error(
                    field.as_str(),
                    "NEGATIVE_VALUE",
                    format!("Field '{field}' must be positive (got {value})"),
                ));
            }
        }

        for check in &self.balance_checks {
            check.apply(data, tolerance, findings);
        }

        for rule in &self.cross_validations {
            rule.apply(data, findings);
        }
    }
}

impl BalanceCheck {
    /// Sum of the numeric fields; `None` when it leaves the `Decimal` range.
    fn sum(fields: &[String], data: &DataSnapshot) -> Option<Decimal> {
        fields
            .iter()
            .filter_map(|f| data.get(f).and_then(snapshot::as_decimal))
            .try_fold(Decimal::ZERO, Decimal::checked_add)
    }

    /// Compares both sums; missing fields count as zero.
    ///
    /// A side whose sum overflows gives an `AMOUNT_OVERFLOW` error instead
    /// of a comparison.
    pub fn apply(&self, data: &DataSnapshot, default: Tolerance, findings: &mut Vec<Finding>) {
        let field = self.left_fields.first().cloned().unwrap_or_default();
        let (Some(left), Some(right)) = (
            Self::sum(&self.left_fields, data),
            Self::sum(&self.right_fields, data),
        ) else {
            findings.push(Finding::error(
                field,
                "AMOUNT_OVERFLOW",
                format!(
                    "Balance check {} = {} cannot be computed: amounts out of range",
                    self.left_fields.join(" + "),
                    self.right_fields.join(" + "),
                ),
            ));
            return;
        };
        let tolerance = self.tolerance.map_or(default, Tolerance::new);

        if tolerance.exceeds(left, right) {
            let message = self.message.clone().unwrap_or_else(|| {
                format!(
                    "Balance check failed: {} = {left}, {} = {right}",
                    self.left_fields.join(" + "),
                    self.right_fields.join(" + "),
                )
            });
            findings.push(Finding::error(field, "BALANCE_MISMATCH", message));
        }
    }
}

impl CrossValidation {
    /// Evaluates the condition; a malformed or failing expression is a warning.
    pub fn apply(&self, data: &DataSnapshot, findings: &mut Vec<Finding>) {
        let expression = match Expression::parse(&self.condition) {
            Ok(expression) => expression,
            Err(err) => {
                findings.push(Finding::warning(
                    "rules",
                    "INVALID_RULE_EXPRESSION",
                    format!("Cannot parse rule '{}': {err}", self.condition),
                ));
                return;
            }
        };

        let field = expression
            .fields()
            .first()
            .map_or_else(|| "rules".to_string(), |f| (*f).to_string());

        match expression.evaluate_bool(data) {
            Ok(true) => {}
            Ok(false) => findings.push(Finding::new(
                field,
                "CROSS_VALIDATION",
                self.message.clone(),
                self.severity,
            )),
            Err(err) => findings.push(Finding::warning(
                field,
                "INVALID_RULE_EXPRESSION",
                format!("Cannot evaluate rule '{}': {err}", self.condition),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn run(rules: serde_json::Value, data: serde_json::Value) -> Vec<Finding> {
        let rules: BusinessRules = serde_json::from_value(rules).unwrap();
        let mut findings = Vec::new();
        rules.apply(&DataSnapshot::from_value(data), Tolerance::CENT, &mut findings);
        findings
    }

    #[test]
    fn test_required_numeric_positive() {
        let findings = run(
            json!({"required": ["siren"], "numeric": ["capital"], "positive": ["effectif"]}),
            json!({"capital": "beaucoup", "effectif": -3}),
        );
        let codes: Vec<_> = findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["REQUIRED_FIELD", "INVALID_TYPE", "NEGATIVE_VALUE"]);
    }

    #[test]
    fn test_required_not_duplicated() {
        let rules = BusinessRules {
            required: vec!["siren".into()],
            ..Default::default()
        };
        let mut findings = vec![Finding::error("siren", "REQUIRED_FIELD", "SIREN requis")];
        rules.apply(&DataSnapshot::default(), Tolerance::CENT, &mut findings);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_balance_check_with_aliases_and_tolerance() {
        let rules = json!({"balanceChecks": [{
            "left": ["actif_immobilise", "actif_circulant"],
            "right": ["total_passif"],
            "tolerance": 1.0
        }]});

        let ok = run(rules.clone(), json!({"actif_immobilise": 600, "actif_circulant": 400.5, "total_passif": 1000}));
        assert!(ok.is_empty());

        let ko = run(rules, json!({"actif_immobilise": 600, "actif_circulant": 400, "total_passif": 1002}));
        assert_eq!(ko.len(), 1);
        assert_eq!(ko[0].code, "BALANCE_MISMATCH");
        assert_eq!(ko[0].field, "actif_immobilise");
    }

    #[test]
    fn test_balance_check_custom_message() {
        let findings = run(
            json!({"balanceChecks": [{
                "leftFields": ["total_actif"], "rightFields": ["total_passif"],
                "message": "Le bilan n'est pas équilibré"
            }]}),
            json!({"total_actif": dec!(100.02).to_string(), "total_passif": 100}),
        );
        assert_eq!(findings[0].message, "Le bilan n'est pas équilibré");
    }

    #[test]
    fn test_balance_check_overflow_is_a_finding() {
        let huge = Decimal::MAX.to_string();
        let findings = run(
            json!({"balanceChecks": [
                {"leftFields": ["a", "b"], "rightFields": ["c"]},
                {"leftFields": ["c"], "rightFields": ["c"]}
            ]}),
            json!({"a": huge, "b": huge, "c": 1}),
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "AMOUNT_OVERFLOW");
        assert_eq!(findings[0].field, "a");
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_balance_check_extreme_difference() {
        let findings = run(
            json!({"balanceChecks": [{"leftFields": ["a"], "rightFields": ["b"]}]}),
            json!({"a": Decimal::MAX.to_string(), "b": Decimal::MIN.to_string()}),
        );
        assert_eq!(findings[0].code, "BALANCE_MISMATCH");
    }

    #[test]
    fn test_cross_validation_severity() {
        let findings = run(
            json!({"crossValidations": [
                {"condition": "capital >= 1000000", "message": "Capital minimum SA", "severity": "warning"},
                {"condition": "resultat <= chiffre_affaires", "message": "Résultat incohérent"}
            ]}),
            json!({"capital": 10000, "resultat": 5000, "chiffre_affaires": 1000}),
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].field, "capital");
        assert_eq!(findings[1].severity, Severity::Error);
        assert_eq!(findings[1].code, "CROSS_VALIDATION");
    }

    #[test]
    fn test_malformed_expression_is_warning() {
        let findings = run(
            json!({"crossValidations": [
                {"condition": "capital >", "message": "x"},
                {"condition": "capital / zero > 1", "message": "y"}
            ]}),
            json!({"capital": 10}),
        );
        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .all(|f| f.code == "INVALID_RULE_EXPRESSION" && f.severity == Severity::Warning));
    }

    #[test]
    fn test_deeply_nested_expression_is_warning() {
        let condition = format!("{}capital{} > 0", "(".repeat(5_000), ")".repeat(5_000));
        let findings = run(
            json!({"crossValidations": [{"condition": condition, "message": "x"}]}),
            json!({"capital": 10}),
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "INVALID_RULE_EXPRESSION");
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("nested deeper than 64"));
    }
}
