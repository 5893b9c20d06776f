//! Display conditions gating sections and fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::snapshot::{self, DataSnapshot};

/// Comparison operator of a display condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    /// Loosely equal.
    Equals,
    /// Not loosely equal.
    NotEquals,
    /// Numerically greater.
    GreaterThan,
    /// Numerically lower.
    LessThan,
    /// Substring, or membership for arrays.
    Contains,
    /// Missing or blank.
    IsEmpty,
    /// Present and not blank.
    IsNotEmpty,
}

/// A single display condition: `data[field] <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCondition {
    /// Data key to inspect.
    pub field: String,
    /// Operator.
    pub operator: ConditionOperator,
    /// Operand; ignored by `isEmpty` / `isNotEmpty`.
    #[serde(default)]
    pub value: Value,
}

impl DisplayCondition {
    /// Evaluates the condition against the snapshot.
    #[must_use]
    pub fn evaluate(&self, data: &DataSnapshot) -> bool {
        let actual = data.get(&self.field).unwrap_or(&Value::Null);
        match self.operator {
            ConditionOperator::Equals => snapshot::loose_eq(actual, &self.value),
            ConditionOperator::NotEquals => !snapshot::loose_eq(actual, &self.value),
            ConditionOperator::GreaterThan => compare(actual, &self.value, |l, r| l > r),
            ConditionOperator::LessThan => compare(actual, &self.value, |l, r| l < r),
            ConditionOperator::Contains => contains(actual, &self.value),
            ConditionOperator::IsEmpty => snapshot::is_empty(actual),
            ConditionOperator::IsNotEmpty => !snapshot::is_empty(actual),
        }
    }

    /// Returns true if every condition holds (an empty list holds).
    #[must_use]
    pub fn all_hold(conditions: &[Self], data: &DataSnapshot) -> bool {
        conditions.iter().all(|c| c.evaluate(data))
    }
}

fn compare(
    actual: &Value,
    expected: &Value,
    op: impl Fn(Decimal, Decimal) -> bool,
) -> bool {
    match (snapshot::as_decimal(actual), snapshot::as_decimal(expected)) {
        (Some(l), Some(r)) => op(l, r),
        _ => false,
    }
}

fn contains(actual: &Value, needle: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| snapshot::loose_eq(item, needle)),
        Value::Null => false,
        other => snapshot::as_text(other).contains(&snapshot::as_text(needle)),
    }
}
