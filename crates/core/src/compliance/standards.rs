//! Standard-specific checks.
//!
//! Each accounting standard contributes a [`StandardCheck`]; the validator
//! holds a list of them and runs those matching the document's standard.

use grandlivre_shared::types::Tolerance;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeSet;

use super::snapshot::{self, DataSnapshot};
use super::types::{AccountingStandard, Finding};
use crate::accounts::AccountRegistry;

/// Extra checks for one accounting standard.
pub trait StandardCheck: Send + Sync {
    /// Standard this check applies to.
    fn standard(&self) -> AccountingStandard;

    /// Appends findings for `data`.
    fn check(&self, data: &DataSnapshot, findings: &mut Vec<Finding>);
}

/// Luhn checksum over an ASCII digit string.
#[must_use]
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// French PCG: SIREN / SIRET format.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcgCheck;

impl PcgCheck {
    fn identifier(
        data: &DataSnapshot,
        key: &str,
        length: usize,
        code: &str,
        label: &str,
        findings: &mut Vec<Finding>,
    ) {
        let Some(value) = data.get(key).filter(|v| !snapshot::is_empty(v)) else {
            return;
        };
        let digits: String = snapshot::as_text(value)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if digits.len() != length || !luhn_valid(&digits) {
            findings.push(Finding::error(
                key,
                code,
                format!("{label} must be {length} digits with a valid checksum"),
            ));
        }
    }
}

impl StandardCheck for PcgCheck {
    fn standard(&self) -> AccountingStandard {
        AccountingStandard::Pcg
    }

    fn check(&self, data: &DataSnapshot, findings: &mut Vec<Finding>) {
        Self::identifier(data, "siren", 9, "INVALID_SIREN", "SIREN", findings);
        Self::identifier(data, "siret", 14, "INVALID_SIRET", "SIRET", findings);
    }
}

/// Classes every SYSCOHADA chart must use.
const MANDATORY_CLASSES: [u8; 6] = [1, 2, 4, 5, 6, 7];

/// Accounts every SYSCOHADA chart must carry (prefix, name).
const MANDATORY_ACCOUNTS: [(&str, &str); 8] = [
    ("101", "Capital social"),
    ("121", "Résultat net"),
    ("401", "Fournisseurs"),
    ("411", "Clients"),
    ("512", "Banques"),
    ("521", "Caisse"),
    ("601", "Achats de marchandises"),
    ("701", "Ventes de marchandises"),
];

/// Descriptions suggesting an operation outside ordinary activities.
const HAO_KEYWORDS: [&str; 8] = [
    "exceptionnel",
    "cession",
    "plus-value",
    "moins-value",
    "pénalité",
    "amendes",
    "dons",
    "subvention exceptionnelle",
];

/// SYSCOHADA chart of accounts and HAO separation.
///
/// Reads an optional `accounts` array (strings or objects with
/// `account_number`/`number`) and an optional `entries` array of
/// `{entry_number, description, lines: [{account_number, debit, credit}]}`.
#[derive(Debug, Clone, Copy)]
pub struct SyscohadaCheck {
    tolerance: Tolerance,
}

impl Default for SyscohadaCheck {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::CENT,
        }
    }
}

struct Line {
    account: String,
    debit: Decimal,
    credit: Decimal,
}

fn account_number(value: &Value) -> Option<String> {
    let raw = match value {
        Value::Object(map) => map
            .get("account_number")
            .or_else(|| map.get("number"))
            .or_else(|| map.get("account"))
            .map(snapshot::as_text),
        Value::Null => None,
        other => Some(snapshot::as_text(other)),
    }?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn amount(map: &serde_json::Map<String, Value>, key: &str) -> Decimal {
    map.get(key).and_then(snapshot::as_decimal).unwrap_or_default()
}

fn entry_lines(entry: &Value) -> Vec<Line> {
    entry
        .get("lines")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(|line| {
                    let map = line.as_object()?;
                    Some(Line {
                        account: account_number(line).unwrap_or_default(),
                        debit: amount(map, "debit"),
                        credit: amount(map, "credit"),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl SyscohadaCheck {
    /// Creates the check with a custom balance tolerance.
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    fn check_chart(accounts: &[Value], findings: &mut Vec<Finding>) {
        let numbers: Vec<String> = accounts.iter().filter_map(account_number).collect();
        let mut classes = BTreeSet::new();

        for number in &numbers {
            let class = AccountRegistry::class_of(number);
            if (1..=8).contains(&class) {
                classes.insert(class);
            } else {
                findings.push(Finding::error(
                    number.as_str(),
                    "INVALID_ACCOUNT_CLASS",
                    format!("Account {number} does not belong to a SYSCOHADA class (1-8)"),
                ));
            }
            let length = number.chars().count();
            if !(2..=6).contains(&length) {
                findings.push(Finding::warning(
                    number.as_str(),
                    "INVALID_ACCOUNT_LENGTH",
                    format!("Account {number} should have between 2 and 6 digits"),
                ));
            }
        }

        for class in MANDATORY_CLASSES {
            if !classes.contains(&class) {
                findings.push(Finding::warning(
                    format!("class_{class}"),
                    "MISSING_MANDATORY_CLASS",
                    format!(
                        "Mandatory class {class} ({}) has no account",
                        AccountRegistry::class_name(class).unwrap_or_default()
                    ),
                ));
            }
        }

        for (prefix, name) in MANDATORY_ACCOUNTS {
            if !numbers.iter().any(|n| n.starts_with(prefix)) {
                findings.push(Finding::warning(
                    prefix,
                    "MISSING_MANDATORY_ACCOUNT",
                    format!("Mandatory account {prefix} ({name}) is missing"),
                ));
            }
        }
    }

    fn check_entries(&self, entries: &[Value], findings: &mut Vec<Finding>) {
        let mut totals = RunningTotals::default();
        let mut has_class_8 = false;

        for entry in entries {
            let lines = entry_lines(entry);
            for line in &lines {
                totals.add_line(line);
                has_class_8 |= line.account.starts_with('8');
            }

            let description = entry
                .get("description")
                .map(snapshot::as_text)
                .unwrap_or_default()
                .to_lowercase();
            let looks_hao = HAO_KEYWORDS.iter().any(|k| description.contains(k));
            let uses_class_8 = lines.iter().any(|l| l.account.starts_with('8'));
            let uses_ordinary = lines
                .iter()
                .any(|l| l.account.starts_with('6') || l.account.starts_with('7'));
            if looks_hao && !uses_class_8 && uses_ordinary {
                let number = entry
                    .get("entry_number")
                    .map(snapshot::as_text)
                    .unwrap_or_default();
                findings.push(Finding::warning(
                    format!("entry_{number}"),
                    "HAO_NOT_IN_CLASS_8",
                    format!(
                        "Entry {number} looks like an HAO operation but does not use class 8 (use 81x charges or 82x products)"
                    ),
                ));
            }
        }

        match (totals.debit, totals.credit) {
            (Some(debit), Some(credit)) => {
                if self.tolerance.exceeds(debit, credit) {
                    findings.push(Finding::error(
                        "entries",
                        "BALANCE_UNBALANCED",
                        format!(
                            "Entries are unbalanced: debit {} vs credit {}",
                            debit.round_dp(2),
                            credit.round_dp(2)
                        ),
                    ));
                }
            }
            _ => findings.push(Finding::error(
                "entries",
                "AMOUNT_OVERFLOW",
                "Entry totals cannot be computed: amounts out of range",
            )),
        }

        if has_class_8 {
            let result = totals
                .hao_products
                .zip(totals.hao_charges)
                .and_then(|(products, charges)| {
                    Some((products.checked_sub(charges)?, products, charges))
                });
            match result {
                Some((result, products, charges)) => findings.push(Finding::info(
                    "class_8",
                    "HAO_RESULT_INFO",
                    format!(
                        "HAO result: {} (products {}, charges {})",
                        result.round_dp(2),
                        products.round_dp(2),
                        charges.round_dp(2)
                    ),
                )),
                None => findings.push(Finding::error(
                    "class_8",
                    "AMOUNT_OVERFLOW",
                    "HAO result cannot be computed: amounts out of range",
                )),
            }
        }
    }
}

/// Entry totals; a `None` total has left the `Decimal` range and stays `None`.
struct RunningTotals {
    debit: Option<Decimal>,
    credit: Option<Decimal>,
    hao_charges: Option<Decimal>,
    hao_products: Option<Decimal>,
}

impl Default for RunningTotals {
    fn default() -> Self {
        Self {
            debit: Some(Decimal::ZERO),
            credit: Some(Decimal::ZERO),
            hao_charges: Some(Decimal::ZERO),
            hao_products: Some(Decimal::ZERO),
        }
    }
}

fn accumulate(total: &mut Option<Decimal>, amount: Option<Decimal>) {
    *total = total.zip(amount).and_then(|(t, a)| t.checked_add(a));
}

impl RunningTotals {
    fn add_line(&mut self, line: &Line) {
        accumulate(&mut self.debit, Some(line.debit));
        accumulate(&mut self.credit, Some(line.credit));
        if line.account.starts_with("81") {
            accumulate(&mut self.hao_charges, line.debit.checked_sub(line.credit));
        } else if line.account.starts_with("82") {
            accumulate(&mut self.hao_products, line.credit.checked_sub(line.debit));
        }
    }
}

impl StandardCheck for SyscohadaCheck {
    fn standard(&self) -> AccountingStandard {
        AccountingStandard::Syscohada
    }

    fn check(&self, data: &DataSnapshot, findings: &mut Vec<Finding>) {
        if let Some(accounts) = data.get("accounts").and_then(Value::as_array) {
            Self::check_chart(accounts, findings);
        }
        if let Some(entries) = data.get("entries").and_then(Value::as_array) {
            self.check_entries(entries, findings);
        }
    }
}

/// IFRS: schema and business rules only.
#[derive(Debug, Clone, Copy, Default)]
pub struct IfrsCheck;

impl StandardCheck for IfrsCheck {
    fn standard(&self) -> AccountingStandard {
        AccountingStandard::Ifrs
    }

    fn check(&self, _data: &DataSnapshot, _findings: &mut Vec<Finding>) {}
}
