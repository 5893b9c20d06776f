//! Form schema description.
//!
//! Schemas arrive as JSON (sections → subsections → fields). Field kinds
//! and bounds are closed types here; unknown kinds deserialize to
//! [`FieldKind::Other`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::DisplayCondition;

/// A complete form schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Top-level sections.
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

/// A section (or subsection) of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    /// Section identifier.
    #[serde(default)]
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Fields directly in this section.
    #[serde(default)]
    pub fields: Vec<FormField>,
    /// Nested sections.
    #[serde(default)]
    pub subsections: Vec<FormSection>,
    /// Display conditions; all must hold for the section to be visited.
    #[serde(default)]
    pub conditions: Vec<DisplayCondition>,
}

/// Kind of a form field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Any number.
    Number,
    /// A monetary amount; negative values are warned about.
    Currency,
    /// A percentage.
    Percentage,
    /// Free text.
    #[serde(alias = "textarea", alias = "email", alias = "tel")]
    Text,
    /// A calendar date.
    Date,
    /// One of a list of options.
    #[serde(alias = "radio")]
    Select,
    /// Unsupported kinds only get the required check.
    #[default]
    #[serde(other)]
    Other,
}

impl FieldKind {
    /// Returns true for number, currency and percentage.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Currency | Self::Percentage)
    }
}

/// A min/max bound: a number, or text (ISO dates for date fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// Numeric bound.
    Number(Decimal),
    /// Textual bound.
    Text(String),
}

impl Bound {
    /// Returns the bound as a number, parsing text when possible.
    #[must_use]
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Returns the bound as text.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// An option of a select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Stored value.
    pub value: Value,
    /// Display label.
    #[serde(default)]
    pub label: String,
}

/// A single form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Field identifier.
    pub id: String,
    /// Data key; falls back to `id`.
    #[serde(default)]
    pub name: Option<String>,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Field kind.
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    /// Value must be present.
    #[serde(default)]
    pub required: bool,
    /// Lower bound.
    #[serde(default)]
    pub min: Option<Bound>,
    /// Upper bound.
    #[serde(default)]
    pub max: Option<Bound>,
    /// Regex the text must match.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Message used instead of the default one.
    #[serde(default)]
    pub validation_message: Option<String>,
    /// Minimum text length.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum text length.
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Read-only fields are not validated.
    #[serde(default, alias = "readOnly")]
    pub readonly: bool,
    /// Hidden fields are not validated.
    #[serde(default)]
    pub hidden: bool,
    /// Display conditions.
    #[serde(default)]
    pub conditions: Vec<DisplayCondition>,
    /// Options of a select field.
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl FormField {
    /// Key under which the field's value is stored in the data snapshot.
    #[must_use]
    pub fn key(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.id)
    }

    /// Label for messages; falls back to the key.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            self.key()
        } else {
            &self.label
        }
    }
}
