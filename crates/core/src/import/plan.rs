//! Import planning: parse rows, collect referenced journals and accounts,
//! group rows into entries.
//!
//! Planning is pure. The reconciler turns a plan into store writes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::journals::infer_journal;
use super::parse::{parse_amount, parse_date};
use super::types::{FecRow, ImportRowError};
use crate::accounts::AccountRegistry;
use crate::ledger::{EntryTotals, JournalType};

/// Journal code used when a row has none.
pub const DEFAULT_JOURNAL_CODE: &str = "OD";

/// A journal referenced by the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSpec {
    /// Code.
    pub code: String,
    /// Inferred name.
    pub name: String,
    /// Inferred type.
    pub journal_type: JournalType,
}

/// An account referenced by the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    /// Account number.
    pub number: String,
    /// Name from `CompteLib`, else `Compte {number}`.
    pub name: String,
    /// Whether the number may be created (class 1-8, digits only).
    pub creatable: bool,
}

/// One parsed row, ready to become an entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    /// Zero-based input row.
    pub row: usize,
    /// Account number.
    pub account_number: String,
    /// Debit (>= 0).
    pub debit: Decimal,
    /// Credit (>= 0).
    pub credit: Decimal,
    /// Line label (`EcritureLib`).
    pub label: Option<String>,
    /// Currency (`Idevise`).
    pub currency: Option<String>,
    /// Remark turning the row status into a warning.
    pub warning: Option<String>,
}

/// Rows sharing one (journal code, entry number) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
    /// Journal code.
    pub journal_code: String,
    /// Entry number.
    pub entry_number: String,
    /// Date of the first row.
    pub date: NaiveDate,
    /// Description of the first row.
    pub description: String,
    /// Piece reference of the first row.
    pub reference: Option<String>,
    /// Lines in input order.
    pub lines: Vec<PlannedLine>,
}

impl EntryGroup {
    /// Totals over `lines`, or `None` if they leave the `Decimal` range.
    #[must_use]
    pub fn totals<'a>(lines: impl IntoIterator<Item = &'a PlannedLine>) -> Option<EntryTotals> {
        EntryTotals::from_amounts(lines.into_iter().map(|l| (l.debit, l.credit)))
    }

    /// Input rows of the group.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().map(|l| l.row)
    }
}

/// Everything the reconciler needs, derived from raw rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Referenced journals, in first-appearance order.
    pub journals: Vec<JournalSpec>,
    /// Referenced accounts, in first-appearance order.
    pub accounts: Vec<AccountSpec>,
    /// Entry groups, in first-appearance order.
    pub groups: Vec<EntryGroup>,
    /// Rows rejected while parsing.
    pub rejected: Vec<ImportRowError>,
    /// (journal code, entry number) of every input row.
    pub keys: Vec<(String, String)>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalizes amounts: a negative debit is a credit and vice versa.
fn normalize_sides(debit: Decimal, credit: Decimal) -> Option<(Decimal, Decimal)> {
    let net_debit = debit.max(Decimal::ZERO).checked_add((-credit).max(Decimal::ZERO))?;
    let net_credit = credit.max(Decimal::ZERO).checked_add((-debit).max(Decimal::ZERO))?;
    Some((net_debit, net_credit))
}

impl ImportPlan {
    /// Builds a plan from raw rows.
    ///
    /// A row whose amounts would take its group's totals out of the
    /// `Decimal` range is rejected, so every group total is computable.
    #[must_use]
    pub fn build(rows: &[FecRow]) -> Self {
        let mut plan = Self::default();
        let mut journal_index: HashMap<String, usize> = HashMap::new();
        let mut account_index: HashMap<String, (usize, bool)> = HashMap::new();
        let mut group_index: HashMap<(String, String), usize> = HashMap::new();
        let mut group_totals: Vec<EntryTotals> = Vec::new();

        for (row, raw) in rows.iter().enumerate() {
            let journal_code =
                non_empty(&raw.journal_code).unwrap_or_else(|| DEFAULT_JOURNAL_CODE.to_string());
            let entry_number = non_empty(&raw.entry_number).unwrap_or_else(|| (row + 1).to_string());
            plan.keys.push((journal_code.clone(), entry_number.clone()));

            let Some(account_number) = non_empty(&raw.account_number) else {
                plan.rejected.push(ImportRowError::new(
                    row,
                    "MISSING_ACCOUNT",
                    "Account number is missing",
                ));
                continue;
            };
            let Some(date) = parse_date(&raw.entry_date) else {
                plan.rejected.push(ImportRowError::new(
                    row,
                    "INVALID_DATE",
                    format!("Invalid entry date '{}'", raw.entry_date),
                ));
                continue;
            };
            let (Some(debit), Some(credit)) = (parse_amount(&raw.debit), parse_amount(&raw.credit))
            else {
                plan.rejected.push(ImportRowError::new(
                    row,
                    "INVALID_AMOUNT",
                    format!("Invalid amount (debit '{}', credit '{}')", raw.debit, raw.credit),
                ));
                continue;
            };

            let warning = if debit.is_zero() && credit.is_zero() {
                Some("Zero amount".to_string())
            } else if !debit.is_zero() && !credit.is_zero() {
                Some("Both debit and credit are set".to_string())
            } else {
                None
            };
            let key = (journal_code, entry_number);
            let group = group_index.get(&key).copied();
            let totals = normalize_sides(debit, credit).and_then(|(debit, credit)| {
                let running = group.map_or(EntryTotals::ZERO, |i| group_totals[i]);
                Some(((debit, credit), running.checked_add(debit, credit)?))
            });
            let Some(((debit, credit), totals)) = totals else {
                plan.rejected.push(ImportRowError::new(
                    row,
                    "INVALID_AMOUNT",
                    format!(
                        "Amount out of range (debit '{}', credit '{}')",
                        raw.debit, raw.credit
                    ),
                ));
                continue;
            };
            let journal_code = &key.0;

            if !journal_index.contains_key(journal_code) {
                let (journal_type, name) = infer_journal(journal_code, Some(&raw.journal_lib));
                journal_index.insert(journal_code.clone(), plan.journals.len());
                plan.journals.push(JournalSpec {
                    code: journal_code.clone(),
                    name,
                    journal_type,
                });
            }

            let label = non_empty(&raw.account_lib);
            match account_index.get_mut(&account_number) {
                Some((i, labelled)) => {
                    // First non-empty label wins.
                    if !*labelled && let Some(label) = label {
                        plan.accounts[*i].name = label;
                        *labelled = true;
                    }
                }
                None => {
                    account_index.insert(
                        account_number.clone(),
                        (plan.accounts.len(), label.is_some()),
                    );
                    plan.accounts.push(AccountSpec {
                        name: label.unwrap_or_else(|| format!("Compte {account_number}")),
                        creatable: AccountRegistry::is_valid_number(&account_number),
                        number: account_number.clone(),
                    });
                }
            }

            let line = PlannedLine {
                row,
                account_number,
                debit,
                credit,
                label: non_empty(&raw.entry_lib),
                currency: raw.currency.as_deref().and_then(non_empty),
                warning,
            };

            if let Some(i) = group {
                plan.groups[i].lines.push(line);
                group_totals[i] = totals;
            } else {
                group_index.insert(key.clone(), plan.groups.len());
                group_totals.push(totals);
                plan.groups.push(EntryGroup {
                    journal_code: key.0,
                    entry_number: key.1,
                    date,
                    description: non_empty(&raw.entry_lib).unwrap_or_default(),
                    reference: non_empty(&raw.piece_ref),
                    lines: vec![line],
                });
            }
        }

        plan
    }
}
