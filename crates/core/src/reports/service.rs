//! Statement generation from aggregated balances.
//!
//! Each statement is built from the output of one
//! [`LedgerAggregator`](crate::ledger::LedgerAggregator) call; only the
//! trial balance asks for zero-balance accounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    BalanceSheetReport, BalanceSheetSection, BalanceSheetSubsection, IncomeStatementReport,
    IncomeStatementSection, StatementContext, TrialBalanceReport, TrialBalanceRow,
    TrialBalanceTotals,
};
use crate::accounts::{AccountRegistry, AccountType};
use crate::ledger::{BalanceRecord, ReportPeriod};

const FIXED_ASSETS: &str = "Actif immobilisé";
const CURRENT_ASSETS: &str = "Actif circulant";
const LONG_TERM_LIABILITIES: &str = "Dettes financières";
const CURRENT_LIABILITIES: &str = "Dettes à court terme";
const EQUITY: &str = "Capitaux propres";

/// Service for building financial statements.
pub struct StatementBuilder;

impl StatementBuilder {
    /// Resolves optional period bounds: no start means "since the first
    /// entry", no end means `today`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if start is after end.
    pub fn resolve_period(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<ReportPeriod, ReportError> {
        let end = end.unwrap_or(today);
        if let Some(start) = start
            && start > end
        {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(ReportPeriod::new(start, end))
    }

    /// Generates a trial balance.
    ///
    /// Rows keep the aggregator's account-number order. Totals sum the
    /// debit and credit balance columns.
    #[must_use]
    pub fn trial_balance(records: Vec<BalanceRecord>, ctx: &StatementContext) -> TrialBalanceReport {
        let rows: Vec<TrialBalanceRow> = records
            .into_iter()
            .map(|balance| TrialBalanceRow {
                debit_balance: balance.debit_balance(),
                credit_balance: balance.credit_balance(),
                balance,
            })
            .collect();

        let total_debit: Decimal = rows.iter().map(|r| r.debit_balance).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit_balance).sum();

        TrialBalanceReport {
            report_type: "trial_balance".to_string(),
            period: ctx.period,
            currency: ctx.currency.clone(),
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: ctx.tolerance.approx_eq(total_debit, total_credit),
            },
        }
    }

    /// Generates a balance sheet.
    ///
    /// Assets split into fixed (class 2) and current; liabilities into
    /// long-term (16, 17) and current. Totals use `|closing|`.
    #[must_use]
    pub fn balance_sheet(records: Vec<BalanceRecord>, ctx: &StatementContext) -> BalanceSheetReport {
        let mut fixed = BalanceSheetSubsection::new(FIXED_ASSETS);
        let mut current = BalanceSheetSubsection::new(CURRENT_ASSETS);
        let mut long_term = BalanceSheetSubsection::new(LONG_TERM_LIABILITIES);
        let mut short_term = BalanceSheetSubsection::new(CURRENT_LIABILITIES);
        let mut equity = BalanceSheetSubsection::new(EQUITY);
        let mut revenue = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;

        for record in records {
            match record.account_type {
                AccountType::Asset if record.class == 2 => Self::add_to_subsection(&mut fixed, record),
                AccountType::Asset => Self::add_to_subsection(&mut current, record),
                AccountType::Liability if AccountRegistry::is_long_term_debt(&record.account_number) => {
                    Self::add_to_subsection(&mut long_term, record);
                }
                AccountType::Liability => Self::add_to_subsection(&mut short_term, record),
                AccountType::Equity => Self::add_to_subsection(&mut equity, record),
                AccountType::Revenue => revenue += record.closing.abs(),
                AccountType::Expense => expenses += record.closing.abs(),
                AccountType::Other => {}
            }
        }

        let assets = Self::section(vec![fixed, current]);
        let liabilities = Self::section(vec![long_term, short_term]);
        let equity = Self::section(vec![equity]);

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total;
        let total_liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            report_type: "balance_sheet".to_string(),
            period: ctx.period,
            currency: ctx.currency.clone(),
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            total_liabilities_and_equity,
            period_result: revenue - expenses,
            is_balanced: ctx
                .tolerance
                .approx_eq(total_assets, total_liabilities_and_equity),
        }
    }

    /// Generates an income statement.
    ///
    /// Operating income and net income are both revenue minus expenses.
    #[must_use]
    pub fn income_statement(
        records: Vec<BalanceRecord>,
        ctx: &StatementContext,
    ) -> IncomeStatementReport {
        let mut revenue = IncomeStatementSection::default();
        let mut expenses = IncomeStatementSection::default();

        for record in records {
            match record.account_type {
                AccountType::Revenue => Self::add_to_income_section(&mut revenue, record),
                AccountType::Expense => Self::add_to_income_section(&mut expenses, record),
                _ => {}
            }
        }

        let operating_income = revenue.total - expenses.total;

        IncomeStatementReport {
            report_type: "income_statement".to_string(),
            period: ctx.period,
            currency: ctx.currency.clone(),
            revenue,
            expenses,
            operating_income,
            net_income: operating_income,
        }
    }

    fn section(subsections: Vec<BalanceSheetSubsection>) -> BalanceSheetSection {
        BalanceSheetSection {
            total: subsections.iter().map(|s| s.total).sum(),
            subsections,
        }
    }

    fn add_to_subsection(subsection: &mut BalanceSheetSubsection, record: BalanceRecord) {
        subsection.total += record.closing.abs();
        subsection.accounts.push(record);
    }

    fn add_to_income_section(section: &mut IncomeStatementSection, record: BalanceRecord) {
        section.total += record.closing.abs();
        section.accounts.push(record);
    }
}
