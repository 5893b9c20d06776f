//! Report data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grandlivre_shared::types::Tolerance;

use crate::ledger::{BalanceRecord, ReportPeriod};

/// Shared inputs of every statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementContext {
    /// Reporting period.
    pub period: ReportPeriod,
    /// Presentation currency.
    pub currency: String,
    /// Tolerance for the `is_balanced` flags.
    pub tolerance: Tolerance,
}

/// One row of the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Underlying balance.
    #[serde(flatten)]
    pub balance: BalanceRecord,
    /// `max(closing, 0)`.
    pub debit_balance: Decimal,
    /// `max(-closing, 0)`.
    pub credit_balance: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report type identifier.
    pub report_type: String,
    /// Reporting period.
    pub period: ReportPeriod,
    /// Currency code.
    pub currency: String,
    /// Rows sorted by account number.
    pub rows: Vec<TrialBalanceRow>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Balance sheet section (assets, liabilities, equity).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetSection {
    /// Section total.
    pub total: Decimal,
    /// Subsections (fixed/current assets, long-term/current liabilities).
    pub subsections: Vec<BalanceSheetSubsection>,
}

/// Balance sheet subsection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetSubsection {
    /// Subsection name.
    pub name: String,
    /// Subsection total.
    pub total: Decimal,
    /// Accounts in this subsection.
    pub accounts: Vec<BalanceRecord>,
}

impl BalanceSheetSubsection {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total: Decimal::ZERO,
            accounts: Vec::new(),
        }
    }
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report type identifier.
    pub report_type: String,
    /// Reporting period.
    pub period: ReportPeriod,
    /// Currency code.
    pub currency: String,
    /// Assets section.
    pub assets: BalanceSheetSection,
    /// Liabilities section.
    pub liabilities: BalanceSheetSection,
    /// Equity section.
    pub equity: BalanceSheetSection,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub total_liabilities_and_equity: Decimal,
    /// Revenue minus expenses not yet closed into equity (informational).
    pub period_result: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Income statement section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatementSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section.
    pub accounts: Vec<BalanceRecord>,
}

/// Income statement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Report type identifier.
    pub report_type: String,
    /// Reporting period.
    pub period: ReportPeriod,
    /// Currency code.
    pub currency: String,
    /// Revenue section (class 7).
    pub revenue: IncomeStatementSection,
    /// Expense section (class 6).
    pub expenses: IncomeStatementSection,
    /// Revenue minus expenses.
    pub operating_income: Decimal,
    /// Equal to operating income; no below-the-line items are separated.
    pub net_income: Decimal,
}
