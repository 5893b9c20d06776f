//! Per-field checks.

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;

use super::schema::{Bound, FieldKind, FormField};
use super::snapshot::{self, DataSnapshot};
use super::types::Finding;
use crate::import::parse_date;

/// Validates one visible field, appending findings.
///
/// Hidden and read-only fields are ignored. A missing required value stops
/// further checks on the field.
pub fn check_field(field: &FormField, data: &DataSnapshot, findings: &mut Vec<Finding>) {
    if field.hidden || field.readonly {
        return;
    }

    let key = field.key();
    let value = data.get(key).unwrap_or(&Value::Null);

    if snapshot::is_empty(value) {
        if field.required {
            let message = field
                .validation_message
                .clone()
                .unwrap_or_else(|| format!("{} is required", field.display_name()));
            findings.push(Finding::error(key, "REQUIRED_FIELD", message));
        }
        return;
    }

    match field.kind {
        FieldKind::Number | FieldKind::Currency | FieldKind::Percentage => {
            check_numeric(field, value, findings);
        }
        FieldKind::Text => check_text(field, value, findings),
        FieldKind::Date => check_date(field, value, findings),
        FieldKind::Select => check_select(field, value, findings),
        FieldKind::Other => {}
    }
}

fn check_numeric(field: &FormField, value: &Value, findings: &mut Vec<Finding>) {
    let key = field.key();
    let name = field.display_name();

    let Some(number) = snapshot::as_decimal(value) else {
        findings.push(Finding::error(
            key,
            "INVALID_TYPE",
            format!("{name} must be a number"),
        ));
        return;
    };

    if let Some(min) = field.min.as_ref().and_then(Bound::as_number)
        && number < min
    {
        findings.push(Finding::error(
            key,
            "MIN_VALUE",
            format!("{name} must be at least {min}"),
        ));
    }
    if let Some(max) = field.max.as_ref().and_then(Bound::as_number)
        && number > max
    {
        findings.push(Finding::error(
            key,
            "MAX_VALUE",
            format!("{name} must be at most {max}"),
        ));
    }
    if field.kind == FieldKind::Currency && number.is_sign_negative() && !number.is_zero() {
        findings.push(Finding::warning(
            key,
            "NEGATIVE_AMOUNT",
            format!("{name} is negative ({number})"),
        ));
    }
}

fn check_text(field: &FormField, value: &Value, findings: &mut Vec<Finding>) {
    let key = field.key();
    let name = field.display_name();
    let text = snapshot::as_text(value);

    if let Some(pattern) = field.pattern.as_deref().filter(|p| !p.is_empty()) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(&text) => {
                let message = field
                    .validation_message
                    .clone()
                    .unwrap_or_else(|| format!("{name} has an invalid format"));
                findings.push(Finding::error(key, "PATTERN_MISMATCH", message));
            }
            Ok(_) => {}
            Err(err) => findings.push(Finding::warning(
                key,
                "INVALID_PATTERN",
                format!("Pattern for {name} is invalid: {err}"),
            )),
        }
    }

    // For text fields min/max are length bounds unless explicit lengths are given.
    let length = text.chars().count();
    let min_length = field
        .min_length
        .or_else(|| field.min.as_ref().and_then(|b| b.as_number()?.to_usize()));
    let max_length = field
        .max_length
        .or_else(|| field.max.as_ref().and_then(|b| b.as_number()?.to_usize()));

    if let Some(min) = min_length
        && length < min
    {
        findings.push(Finding::error(
            key,
            "MIN_LENGTH",
            format!("{name} must be at least {min} characters"),
        ));
    }
    if let Some(max) = max_length
        && length > max
    {
        findings.push(Finding::error(
            key,
            "MAX_LENGTH",
            format!("{name} must be at most {max} characters"),
        ));
    }
}

fn check_date(field: &FormField, value: &Value, findings: &mut Vec<Finding>) {
    let key = field.key();
    let name = field.display_name();

    let Some(date) = parse_date(&snapshot::as_text(value)) else {
        findings.push(Finding::error(
            key,
            "INVALID_DATE",
            format!("{name} is not a valid date"),
        ));
        return;
    };

    if let Some(min) = field.min.as_ref().and_then(|b| parse_date(&b.as_text()))
        && date < min
    {
        findings.push(Finding::error(
            key,
            "DATE_BEFORE_MIN",
            format!("{name} must not be before {min}"),
        ));
    }
    if let Some(max) = field.max.as_ref().and_then(|b| parse_date(&b.as_text()))
        && date > max
    {
        findings.push(Finding::error(
            key,
            "DATE_AFTER_MAX",
            format!("{name} must not be after {max}"),
        ));
    }
}

fn check_select(field: &FormField, value: &Value, findings: &mut Vec<Finding>) {
    if field.options.is_empty() {
        return;
    }
    let allowed = |v: &Value| field.options.iter().any(|o| snapshot::loose_eq(&o.value, v));
    let valid = match value {
        Value::Array(items) => items.iter().all(allowed),
        other => allowed(other),
    };
    if !valid {
        findings.push(Finding::error(
            field.key(),
            "INVALID_OPTION",
            format!("{} has a value outside the allowed options", field.display_name()),
        ));
    }
}
