//! Integration tests for compliance validation through the engine.

mod common;

use serde_json::json;

use common::engine;
use grandlivre_core::compliance::{
    AccountingStandard, BusinessRules, ComplianceValidator, DataSnapshot, FormSchema, ScorePolicy,
    Severity,
};
use grandlivre_shared::types::{CompanyId, Tolerance};

fn declaration_schema() -> FormSchema {
    serde_json::from_value(json!({
        "sections": [{
            "id": "identity",
            "title": "Identification",
            "fields": [
                {"id": "siren", "label": "SIREN", "type": "text", "required": true},
                {"id": "capital", "label": "Capital social", "type": "currency", "required": true, "min": 0}
            ]
        }, {
            "id": "results",
            "title": "Résultat",
            "fields": [
                {"id": "revenue", "label": "Chiffre d'affaires", "type": "currency"},
                {"id": "expenses", "label": "Charges", "type": "currency"},
                {"id": "result", "label": "Résultat", "type": "currency"}
            ]
        }]
    }))
    .unwrap()
}

fn declaration_rules() -> BusinessRules {
    serde_json::from_value(json!({
        "balanceChecks": [
            {"leftFields": ["result"], "rightFields": ["revenue"], "message": "Result must equal revenue"}
        ],
        "crossValidations": [
            {"condition": "revenue - expenses == result", "message": "Result is revenue minus expenses"}
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_complete_declaration_scores_full_marks() {
    let (_store, engine) = engine();
    let data = DataSnapshot::default()
        .with("siren", "732829320")
        .with("capital", 10000)
        .with("revenue", 5000)
        .with("expenses", 0)
        .with("result", 5000);

    let result = engine.validate(
        CompanyId::new(),
        &declaration_schema(),
        &declaration_rules(),
        &data,
        AccountingStandard::Pcg,
    );

    assert!(result.is_valid, "{:?}", result.errors);
    assert_eq!(result.compliance_score, 100);
}

#[tokio::test]
async fn test_findings_lower_the_score() {
    let (_store, engine) = engine();
    let data = DataSnapshot::default()
        .with("siren", "123")
        .with("revenue", 5000)
        .with("expenses", 1000)
        .with("result", 3000);

    let result = engine.validate(
        CompanyId::new(),
        &declaration_schema(),
        &declaration_rules(),
        &data,
        AccountingStandard::Pcg,
    );

    assert!(!result.is_valid);
    assert!(result.has_code("REQUIRED_FIELD"));
    assert!(result.has_code("INVALID_SIREN"));
    assert!(result.has_code("BALANCE_MISMATCH"));
    assert!(result.has_code("CROSS_VALIDATION"));
    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    let penalty = 20 * errors + 5 * warnings;
    assert_eq!(
        usize::from(result.compliance_score),
        100usize.saturating_sub(penalty)
    );
}

#[tokio::test]
async fn test_custom_score_policy_is_injected() {
    let (_store, engine) = engine();
    let engine = engine.with_validator(ComplianceValidator::with_default_checks(
        Tolerance::CENT,
        ScorePolicy {
            error_weight: 50,
            warning_weight: 0,
        },
    ));
    let data = DataSnapshot::default().with("siren", "732829320");

    let result = engine.validate(
        CompanyId::new(),
        &declaration_schema(),
        &BusinessRules::default(),
        &data,
        AccountingStandard::Ifrs,
    );

    assert_eq!(result.count(Severity::Error), 1);
    assert_eq!(result.compliance_score, 50);
}

#[tokio::test]
async fn test_syscohada_chart_checks() {
    let (_store, engine) = engine();
    let data = DataSnapshot::from_value(json!({
        "accounts": ["101000", "121000", "241000", "401000", "411000", "512000", "521000", "601000", "701000"],
        "entries": [{
            "entry_number": "AC-1",
            "description": "Achat de marchandises",
            "lines": [
                {"account_number": "601000", "debit": 100, "credit": 0},
                {"account_number": "512000", "debit": 0, "credit": 100}
            ]
        }]
    }));

    let result = engine.validate(
        CompanyId::new(),
        &FormSchema::default(),
        &BusinessRules::default(),
        &data,
        AccountingStandard::Syscohada,
    );

    assert!(result.is_valid, "{:?}", result.errors);
    assert_eq!(result.compliance_score, 100);
}

#[tokio::test]
async fn test_syscohada_incomplete_chart_warns() {
    let (_store, engine) = engine();
    let data = DataSnapshot::from_value(json!({
        "accounts": ["101000", "411000", "9"],
        "entries": [{
            "entry_number": "OD-1",
            "description": "Cession d'immobilisation",
            "lines": [
                {"account_number": "512000", "debit": 500, "credit": 0},
                {"account_number": "701000", "debit": 0, "credit": 400}
            ]
        }]
    }));

    let result = engine.validate(
        CompanyId::new(),
        &FormSchema::default(),
        &BusinessRules::default(),
        &data,
        AccountingStandard::Syscohada,
    );

    assert!(!result.is_valid);
    assert!(result.has_code("INVALID_ACCOUNT_CLASS"));
    assert!(result.has_code("MISSING_MANDATORY_CLASS"));
    assert!(result.has_code("MISSING_MANDATORY_ACCOUNT"));
    assert!(result.has_code("HAO_NOT_IN_CLASS_8"));
    assert!(result.has_code("BALANCE_UNBALANCED"));
}
