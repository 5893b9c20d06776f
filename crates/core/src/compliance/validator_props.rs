//! Property-based tests for compliance scoring and validation.

use proptest::prelude::*;
use serde_json::json;

use crate::compliance::rules::BusinessRules;
use crate::compliance::schema::FormSchema;
use crate::compliance::score::ScorePolicy;
use crate::compliance::snapshot::DataSnapshot;
use crate::compliance::types::{AccountingStandard, Finding, Severity};
use crate::compliance::validator::ComplianceValidator;

/// Strategy for generating random severities.
fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Error),
        Just(Severity::Warning),
        Just(Severity::Info),
    ]
}

/// Strategy for generating lists of findings.
fn arb_findings() -> impl Strategy<Value = Vec<Finding>> {
    prop::collection::vec(
        arb_severity().prop_map(|s| Finding::new("field", "CODE", "message", s)),
        0..40,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Score bounds and monotonicity
    // =========================================================================

    /// The score always lies in 0..=100.
    #[test]
    fn prop_score_in_range(findings in arb_findings()) {
        let score = ScorePolicy::default().score(&findings);
        prop_assert!(score <= 100);
    }

    /// Adding an error never raises the score.
    #[test]
    fn prop_score_non_increasing_with_errors(findings in arb_findings(), extra in 1usize..10) {
        let policy = ScorePolicy::default();
        let before = policy.score(&findings);
        let mut more = findings.clone();
        more.extend((0..extra).map(|_| Finding::error("x", "CODE", "m")));
        prop_assert!(policy.score(&more) <= before);
    }

    /// Info findings never change the score.
    #[test]
    fn prop_info_is_free(findings in arb_findings(), extra in 1usize..10) {
        let policy = ScorePolicy::default();
        let mut more = findings.clone();
        more.extend((0..extra).map(|_| Finding::info("x", "CODE", "m")));
        prop_assert_eq!(policy.score(&more), policy.score(&findings));
    }

    // =========================================================================
    // Validity
    // =========================================================================

    /// A document is valid exactly when no required numeric field is missing.
    #[test]
    fn prop_valid_iff_no_error(present in prop::collection::vec(any::<bool>(), 1..8)) {
        let fields: Vec<_> = (0..present.len())
            .map(|i| json!({"id": format!("f{i}"), "type": "number", "required": true}))
            .collect();
        let schema: FormSchema =
            serde_json::from_value(json!({"sections": [{"id": "s", "fields": fields}]})).unwrap();

        let mut data = DataSnapshot::default();
        for (i, is_present) in present.iter().enumerate() {
            if *is_present {
                data = data.with(&format!("f{i}"), i);
            }
        }

        let result = ComplianceValidator::default().validate(
            &schema,
            &BusinessRules::default(),
            &data,
            AccountingStandard::Ifrs,
        );
        let missing = present.iter().filter(|p| !**p).count();
        prop_assert_eq!(result.is_valid, missing == 0);
        prop_assert_eq!(result.count(Severity::Error), missing);
        prop_assert!(result.compliance_score <= 100);
    }
}
