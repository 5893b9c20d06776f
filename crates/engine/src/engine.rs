//! Ledger engine facade.
//!
//! Wires the pure core services to a [`LedgerStore`]: fetch, compute,
//! persist. Statements, compliance validation, workflow transitions,
//! imports and interactive entry editing all go through here.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use grandlivre_core::accounts::Account;
use grandlivre_core::compliance::{
    AccountingStandard, BusinessRules, ComplianceValidator, DataSnapshot, FormSchema, ScorePolicy,
    ValidationResult,
};
use grandlivre_core::import::{FecRow, ImportOutcome};
use grandlivre_core::ledger::{
    AggregateOptions, BalanceRecord, EntryDraft, EntryLine, Journal, JournalEntry,
    LedgerAggregator, LedgerError, validate_amounts,
};
use grandlivre_core::reports::{
    BalanceSheetReport, IncomeStatementReport, StatementBuilder, StatementContext,
    TrialBalanceReport,
};
use grandlivre_core::workflow::{
    EntryAction, EntryStatus, TransitionOutcome, WorkflowError, WorkflowEvent, WorkflowService,
};
use grandlivre_shared::EngineConfig;
use grandlivre_shared::types::{AccountId, CompanyId, EntryId, EntryLineId};

use crate::error::{EngineError, ImportError};
use crate::reconciler::ImportReconciler;
use crate::store::{LedgerStore, StoreError};

/// Statuses whose entries feed the statements.
const REPORTABLE: [EntryStatus; 2] = [EntryStatus::Validated, EntryStatus::Posted];

/// Public entry point of the ledger engine.
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    config: EngineConfig,
    validator: ComplianceValidator,
    reconciler: ImportReconciler,
}

impl LedgerEngine {
    /// Creates an engine with the default compliance checks.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, config: EngineConfig) -> Self {
        let validator =
            ComplianceValidator::with_default_checks(config.tolerance, ScorePolicy::default());
        let reconciler = ImportReconciler::new(Arc::clone(&store), config.clone());
        Self {
            store,
            config,
            validator,
            reconciler,
        }
    }

    /// Replaces the compliance validator.
    #[must_use]
    pub fn with_validator(mut self, validator: ComplianceValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Generates a trial balance.
    ///
    /// # Arguments
    /// * `company_id` - Company to report on
    /// * `start` - Period start, `None` for the beginning of time
    /// * `end` - Period end, `None` for today
    /// * `include_zero` - Keep accounts with no movement and a zero balance
    ///
    /// # Errors
    ///
    /// `ReportError::InvalidDateRange` if `start > end`, or a store error.
    pub async fn generate_trial_balance(
        &self,
        company_id: CompanyId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        include_zero: bool,
    ) -> Result<TrialBalanceReport, EngineError> {
        let (records, ctx) = self.balances(company_id, start, end, include_zero).await?;
        let report = StatementBuilder::trial_balance(records, &ctx);
        info!(
            company_id = %company_id,
            rows = report.rows.len(),
            balanced = report.totals.is_balanced,
            "Trial balance generated"
        );
        Ok(report)
    }

    /// Generates a balance sheet.
    ///
    /// # Errors
    ///
    /// `ReportError::InvalidDateRange` if `start > end`, or a store error.
    pub async fn generate_balance_sheet(
        &self,
        company_id: CompanyId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BalanceSheetReport, EngineError> {
        let (records, ctx) = self.balances(company_id, start, end, false).await?;
        let report = StatementBuilder::balance_sheet(records, &ctx);
        info!(
            company_id = %company_id,
            balanced = report.is_balanced,
            "Balance sheet generated"
        );
        Ok(report)
    }

    /// Generates an income statement.
    ///
    /// # Errors
    ///
    /// `ReportError::InvalidDateRange` if `start > end`, or a store error.
    pub async fn generate_income_statement(
        &self,
        company_id: CompanyId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<IncomeStatementReport, EngineError> {
        let (records, ctx) = self.balances(company_id, start, end, false).await?;
        let report = StatementBuilder::income_statement(records, &ctx);
        info!(
            company_id = %company_id,
            net_income = %report.net_income,
            "Income statement generated"
        );
        Ok(report)
    }

    async fn balances(
        &self,
        company_id: CompanyId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        include_zero_balances: bool,
    ) -> Result<(Vec<BalanceRecord>, StatementContext), EngineError> {
        let period = StatementBuilder::resolve_period(start, end, Utc::now().date_naive())?;
        let accounts = self.store.list_accounts(company_id).await?;
        let lines = self
            .store
            .ledger_lines(company_id, &REPORTABLE, period.end)
            .await?;

        let records = LedgerAggregator::aggregate(
            &accounts,
            &lines,
            period,
            AggregateOptions {
                include_zero_balances,
                tolerance: self.config.tolerance,
            },
        );
        let ctx = StatementContext {
            period,
            currency: self.config.default_currency.clone(),
            tolerance: self.config.tolerance,
        };
        Ok((records, ctx))
    }

    // ========================================================================
    // Compliance
    // ========================================================================

    /// Validates a data snapshot against a form schema, its business rules
    /// and the checks of `standard`.
    #[must_use]
    pub fn validate(
        &self,
        company_id: CompanyId,
        schema: &FormSchema,
        rules: &BusinessRules,
        data: &DataSnapshot,
        standard: AccountingStandard,
    ) -> ValidationResult {
        let result = self.validator.validate(schema, rules, data, standard);
        debug!(
            company_id = %company_id,
            score = result.compliance_score,
            findings = result.errors.len(),
            valid = result.is_valid,
            "Compliance validation done"
        );
        result
    }

    // ========================================================================
    // Workflow
    // ========================================================================

    /// Moves a draft entry to review.
    ///
    /// # Errors
    ///
    /// Unknown entry or store failure. Refused transitions are failed outcomes.
    pub async fn submit_for_review(
        &self,
        entry_id: EntryId,
        comment: Option<String>,
    ) -> Result<TransitionOutcome, EngineError> {
        self.transition(entry_id, EntryAction::Submit, comment).await
    }

    /// Validates an entry under review.
    ///
    /// # Errors
    ///
    /// Unknown entry or store failure. Refused transitions are failed outcomes.
    pub async fn approve(
        &self,
        entry_id: EntryId,
        comment: Option<String>,
    ) -> Result<TransitionOutcome, EngineError> {
        self.transition(entry_id, EntryAction::Approve, comment).await
    }

    /// Returns an entry under review or validated to draft. The comment is
    /// mandatory.
    ///
    /// # Errors
    ///
    /// Unknown entry or store failure. Refused transitions are failed outcomes.
    pub async fn reject(
        &self,
        entry_id: EntryId,
        comment: Option<String>,
    ) -> Result<TransitionOutcome, EngineError> {
        self.transition(entry_id, EntryAction::Reject, comment).await
    }

    /// Posts a validated entry and locks it for good.
    ///
    /// # Errors
    ///
    /// Unknown entry or store failure. Refused transitions are failed outcomes.
    pub async fn post(&self, entry_id: EntryId) -> Result<TransitionOutcome, EngineError> {
        self.transition(entry_id, EntryAction::Post, None).await
    }

    /// Actions currently available on an entry.
    ///
    /// # Errors
    ///
    /// Unknown entry or store failure.
    pub async fn available_actions(&self, entry_id: EntryId) -> Result<Vec<EntryAction>, EngineError> {
        let entry = self.load_entry(entry_id).await?;
        Ok(WorkflowService::available_actions(entry.status, entry.locked))
    }

    /// Audit trail of an entry, oldest first.
    ///
    /// # Errors
    ///
    /// Store failure.
    pub async fn entry_history(&self, entry_id: EntryId) -> Result<Vec<WorkflowEvent>, EngineError> {
        Ok(self.store.entry_events(entry_id).await?)
    }

    async fn transition(
        &self,
        entry_id: EntryId,
        action: EntryAction,
        comment: Option<String>,
    ) -> Result<TransitionOutcome, EngineError> {
        let entry = self.load_entry(entry_id).await?;

        let transition = match WorkflowService::apply(action, entry.status, entry.locked, comment) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(
                    entry_id = %entry_id,
                    action = %action,
                    status = %entry.status,
                    error = %err,
                    "Transition refused"
                );
                return Ok(TransitionOutcome::failed(
                    entry.status,
                    err.error_code(),
                    err.to_string(),
                ));
            }
        };

        match self
            .store
            .compare_and_set_status(entry_id, transition.from, transition.to, transition.lock)
            .await
        {
            Ok(_) => {}
            Err(StoreError::StatusConflict { expected, actual }) => {
                let err = WorkflowError::StatusConflict { expected, actual };
                warn!(entry_id = %entry_id, action = %action, error = %err, "Transition lost a race");
                return Ok(TransitionOutcome::failed(
                    actual,
                    err.error_code(),
                    err.to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        }

        self.store
            .record_event(WorkflowEvent::from_transition(entry_id, &transition))
            .await?;

        info!(
            entry_id = %entry_id,
            action = %action,
            from = %transition.from,
            to = %transition.to,
            "Entry transitioned"
        );
        Ok(TransitionOutcome::succeeded(&transition))
    }

    async fn load_entry(&self, entry_id: EntryId) -> Result<JournalEntry, EngineError> {
        self.store
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| EngineError::entry_not_found(entry_id))
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Imports FEC rows for a company.
    ///
    /// # Errors
    ///
    /// `ImportError::Storage` when the store becomes unavailable.
    pub async fn import_ledger(
        &self,
        company_id: CompanyId,
        rows: &[FecRow],
    ) -> Result<ImportOutcome, ImportError> {
        self.import_ledger_with_cancel(company_id, rows, &CancellationToken::new())
            .await
    }

    /// Imports FEC rows, stopping at the next group boundary once `cancel`
    /// fires.
    ///
    /// # Errors
    ///
    /// `ImportError::Storage` when the store becomes unavailable.
    pub async fn import_ledger_with_cancel(
        &self,
        company_id: CompanyId,
        rows: &[FecRow],
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, ImportError> {
        self.reconciler.import(company_id, rows, cancel).await
    }

    // ========================================================================
    // Entries and accounts
    // ========================================================================

    /// Creates a draft entry.
    ///
    /// # Errors
    ///
    /// Ledger rule violations, unknown journal or account, duplicate entry
    /// number, or a store failure.
    pub async fn create_entry(
        &self,
        company_id: CompanyId,
        draft: EntryDraft,
    ) -> Result<JournalEntry, EngineError> {
        let journal = self.load_journal(company_id, &draft).await?;
        let entry_id = EntryId::new();
        let lines = self.resolve_lines(company_id, entry_id, &draft).await?;

        if self
            .store
            .find_entry(company_id, journal.id, &draft.entry_number)
            .await?
            .is_some()
        {
            return Err(duplicate(&journal, &draft.entry_number));
        }

        let entry = JournalEntry {
            id: entry_id,
            company_id,
            journal_id: journal.id,
            entry_number: draft.entry_number,
            date: draft.date,
            description: draft.description,
            reference: draft.reference,
            status: EntryStatus::Draft,
            locked: false,
            created_at: Utc::now(),
        };

        self.store
            .insert_entry_with_lines(entry.clone(), lines)
            .await
            .map_err(|err| on_duplicate(err, &journal, &entry.entry_number))?;

        info!(
            company_id = %company_id,
            entry_id = %entry.id,
            journal = %journal.code,
            number = %entry.entry_number,
            "Entry created"
        );
        Ok(entry)
    }

    /// Replaces the content of a draft entry.
    ///
    /// # Errors
    ///
    /// `CANNOT_MODIFY_POSTED` / `CANNOT_MODIFY_CANCELLED` / `ENTRY_LOCKED`,
    /// `ENTRY_NOT_EDITABLE` outside draft, ledger rule violations, or a
    /// store failure.
    pub async fn update_entry(
        &self,
        entry_id: EntryId,
        draft: EntryDraft,
    ) -> Result<JournalEntry, EngineError> {
        let current = self.load_entry(entry_id).await?;
        match current.status {
            EntryStatus::Posted => return Err(WorkflowError::CannotModifyPosted.into()),
            EntryStatus::Cancelled => return Err(WorkflowError::CannotModifyCancelled.into()),
            _ if current.locked => return Err(WorkflowError::EntryLocked.into()),
            status if !status.is_editable() => return Err(EngineError::EntryNotEditable(status)),
            _ => {}
        }

        let company_id = current.company_id;
        let journal = self.load_journal(company_id, &draft).await?;
        let lines = self.resolve_lines(company_id, entry_id, &draft).await?;

        let updated = JournalEntry {
            journal_id: journal.id,
            entry_number: draft.entry_number,
            date: draft.date,
            description: draft.description,
            reference: draft.reference,
            ..current
        };

        match self
            .store
            .replace_entry(updated.clone(), lines, EntryStatus::Draft)
            .await
        {
            Ok(()) => {}
            Err(StoreError::StatusConflict { expected, actual }) => {
                return Err(WorkflowError::StatusConflict { expected, actual }.into());
            }
            Err(err) => return Err(on_duplicate(err, &journal, &updated.entry_number)),
        }

        info!(entry_id = %entry_id, number = %updated.entry_number, "Entry updated");
        Ok(updated)
    }

    /// Deactivates an account. Its history stays; new lines are refused.
    ///
    /// # Errors
    ///
    /// `ACCOUNT_NOT_FOUND` or a store failure.
    pub async fn deactivate_account(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> Result<Account, EngineError> {
        let account = self
            .store
            .set_account_active(company_id, account_id, false)
            .await
            .map_err(|err| match err {
                StoreError::NotFound(_) => LedgerError::AccountNotFound(account_id).into(),
                other => EngineError::from(other),
            })?;
        info!(company_id = %company_id, account = %account.number, "Account deactivated");
        Ok(account)
    }

    async fn load_journal(
        &self,
        company_id: CompanyId,
        draft: &EntryDraft,
    ) -> Result<Journal, EngineError> {
        self.store
            .list_journals(company_id)
            .await?
            .into_iter()
            .find(|j| j.id == draft.journal_id)
            .ok_or(EngineError::JournalNotFound(draft.journal_id))
    }

    async fn resolve_lines(
        &self,
        company_id: CompanyId,
        entry_id: EntryId,
        draft: &EntryDraft,
    ) -> Result<Vec<EntryLine>, EngineError> {
        let amounts: Vec<_> = draft.lines.iter().map(|l| (l.debit, l.credit)).collect();
        validate_amounts(&amounts, self.config.tolerance)?;

        let accounts: HashMap<AccountId, Account> = self
            .store
            .list_accounts(company_id)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        draft
            .lines
            .iter()
            .map(|line| {
                let account = accounts
                    .get(&line.account_id)
                    .ok_or(LedgerError::AccountNotFound(line.account_id))?;
                if !account.is_active {
                    return Err(LedgerError::AccountInactive(account.number.clone()).into());
                }
                Ok(EntryLine {
                    id: EntryLineId::new(),
                    entry_id,
                    account_id: account.id,
                    debit: line.debit,
                    credit: line.credit,
                    currency: account.currency.clone(),
                    label: line.label.clone(),
                })
            })
            .collect()
    }
}

fn duplicate(journal: &Journal, number: &str) -> EngineError {
    EngineError::DuplicateEntry {
        journal: journal.code.clone(),
        number: number.to_string(),
    }
}

fn on_duplicate(err: StoreError, journal: &Journal, number: &str) -> EngineError {
    match err {
        StoreError::Duplicate(_) => duplicate(journal, number),
        other => other.into(),
    }
}
