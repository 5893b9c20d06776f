//! The company data snapshot a schema is validated against.
//!
//! A flat key → JSON value map. Helpers here give the loose comparisons
//! form data needs: numbers may arrive as JSON numbers or numeric strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Flat key → value view of a company's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSnapshot(Map<String, Value>);

impl DataSnapshot {
    /// Creates a snapshot from a JSON map.
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Creates a snapshot from a JSON value; non-objects give an empty snapshot.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Returns the raw value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` as a decimal, if it is numeric.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<Decimal> {
        self.get(key).and_then(as_decimal)
    }

    /// Returns true if `key` is missing, null, blank or an empty collection.
    #[must_use]
    pub fn is_empty(&self, key: &str) -> bool {
        self.get(key).is_none_or(is_empty)
    }

    /// Sets a value, returning the snapshot for chaining.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }
}

/// Interprets a JSON value as a decimal.
///
/// Numbers convert directly; strings are trimmed and parsed. Anything else is `None`.
#[must_use]
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Returns true for null, blank strings and empty arrays or objects.
#[must_use]
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Renders a scalar as text; strings are returned without quotes.
#[must_use]
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Loose equality: numerically when both sides are numeric, textually otherwise.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (as_decimal(left), as_decimal(right)) {
        (Some(l), Some(r)) => l == r,
        _ => match (left, right) {
            (Value::Bool(l), Value::Bool(r)) => l == r,
            _ => as_text(left) == as_text(right),
        },
    }
}
