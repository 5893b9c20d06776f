//! Import reconciler: writes an [`ImportPlan`] to a store.
//!
//! Phases run in order (journals, accounts, entries). Journals and accounts
//! are looked up before being created, so re-running the same input creates
//! nothing new. Entry groups are independent and run on a bounded pool;
//! line inserts inside a group are chunked and sequential.
//!
//! Failure policy is partial progress: a store outage aborts the current
//! phase with [`ImportError::Storage`] and keeps what earlier phases wrote,
//! a failed chunk only marks its own rows as errors.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use grandlivre_core::accounts::{Account, AccountRegistry};
use grandlivre_core::import::{
    EntryGroup, FecRow, ImportCounts, ImportOutcome, ImportPlan, ImportRowError, PlannedLine,
    RowOutcome, RowStatus,
};
use grandlivre_core::ledger::{EntryLine, Journal, JournalEntry};
use grandlivre_core::workflow::EntryStatus;
use grandlivre_shared::EngineConfig;
use grandlivre_shared::types::{AccountId, CompanyId, EntryId, EntryLineId, JournalId};

use crate::error::{ImportError, ImportPhase};
use crate::store::{LedgerStore, StoreError};

/// Result of one entry group.
#[derive(Debug, Default)]
struct GroupResult {
    rows: Vec<RowOutcome>,
    errors: Vec<ImportRowError>,
    entry_id: Option<EntryId>,
    existing: bool,
    lines_created: usize,
}

/// Read-only lookups shared by every group of one run.
struct GroupContext<'a> {
    company_id: CompanyId,
    status: EntryStatus,
    journals: &'a HashMap<String, JournalId>,
    accounts: &'a HashMap<String, Account>,
}

/// Writes imports through a [`LedgerStore`].
pub struct ImportReconciler {
    store: Arc<dyn LedgerStore>,
    config: EngineConfig,
}

impl ImportReconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Imports raw rows for one company.
    ///
    /// # Arguments
    /// * `company_id` - Owner of every created row
    /// * `rows` - Raw FEC rows, in file order
    /// * `cancel` - Checked before each entry group starts
    ///
    /// # Returns
    /// Per-phase summaries plus one outcome per input row. A cancelled run
    /// returns `Ok` with `cancelled = true` and the unprocessed rows skipped.
    ///
    /// # Errors
    ///
    /// `ImportError::Storage` when the store becomes unavailable; phases
    /// completed before the failure are kept.
    pub async fn import(
        &self,
        company_id: CompanyId,
        rows: &[FecRow],
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, ImportError> {
        let status = EntryStatus::parse(&self.config.import_status)
            .filter(|s| *s != EntryStatus::Cancelled)
            .ok_or_else(|| ImportError::InvalidStatus(self.config.import_status.clone()))?;

        let plan = ImportPlan::build(rows);
        info!(
            company_id = %company_id,
            rows = rows.len(),
            groups = plan.groups.len(),
            rejected = plan.rejected.len(),
            "Import planned"
        );

        let mut outcome = ImportOutcome::default();

        let journals = self
            .import_journals(company_id, &plan, &mut outcome)
            .await
            .map_err(|source| ImportError::Storage {
                phase: ImportPhase::Journals,
                source,
            })?;

        let accounts = self
            .import_accounts(company_id, &plan, &mut outcome)
            .await
            .map_err(|source| ImportError::Storage {
                phase: ImportPhase::Accounts,
                source,
            })?;

        let ctx = GroupContext {
            company_id,
            status,
            journals: &journals,
            accounts: &accounts,
        };
        self.import_entries(&ctx, &plan, cancel, &mut outcome)
            .await
            .map_err(|source| ImportError::Storage {
                phase: ImportPhase::Entries,
                source,
            })?;

        info!(
            company_id = %company_id,
            imported = outcome.counts.imported(),
            errors = outcome.counts.error,
            skipped = outcome.counts.skipped,
            lines = outcome.lines_created,
            cancelled = outcome.cancelled,
            "Import complete"
        );

        Ok(outcome)
    }

    async fn import_journals(
        &self,
        company_id: CompanyId,
        plan: &ImportPlan,
        outcome: &mut ImportOutcome,
    ) -> Result<HashMap<String, JournalId>, StoreError> {
        let existing = self.store.list_journals(company_id).await?;
        let mut codes: HashMap<String, JournalId> =
            existing.into_iter().map(|j| (j.code, j.id)).collect();

        let missing: Vec<Journal> = plan
            .journals
            .iter()
            .filter(|spec| !codes.contains_key(&spec.code))
            .map(|spec| Journal {
                id: JournalId::new(),
                company_id,
                code: spec.code.clone(),
                name: spec.name.clone(),
                journal_type: spec.journal_type,
                is_active: true,
            })
            .collect();

        outcome.journals.existing = plan.journals.len() - missing.len();
        outcome.journals.created = missing.len();

        if !missing.is_empty() {
            self.store.insert_journals(missing.clone()).await?;
            // The store keeps the first journal per code.
            for journal in self.store.list_journals(company_id).await? {
                codes.insert(journal.code, journal.id);
            }
            outcome.created_ids.journals = missing
                .iter()
                .filter(|j| codes.get(&j.code) == Some(&j.id))
                .map(|j| (j.code.clone(), j.id))
                .collect();
        }

        info!(
            company_id = %company_id,
            created = outcome.journals.created,
            existing = outcome.journals.existing,
            "Journals phase complete"
        );
        Ok(codes)
    }

    async fn import_accounts(
        &self,
        company_id: CompanyId,
        plan: &ImportPlan,
        outcome: &mut ImportOutcome,
    ) -> Result<HashMap<String, Account>, StoreError> {
        let existing = self.store.list_accounts(company_id).await?;
        let mut by_number: HashMap<String, Account> = existing
            .into_iter()
            .map(|a| (a.number.clone(), a))
            .collect();

        let mut missing = Vec::new();
        for spec in &plan.accounts {
            if by_number.contains_key(&spec.number) {
                outcome.accounts.existing += 1;
            } else if spec.creatable && self.config.create_missing_accounts {
                let classification = AccountRegistry::classify(&spec.number);
                missing.push(Account {
                    id: AccountId::new(),
                    company_id,
                    number: spec.number.clone(),
                    name: spec.name.clone(),
                    class: classification.class,
                    account_type: classification.account_type,
                    currency: self.config.default_currency.clone(),
                    is_active: true,
                });
            }
        }
        outcome.accounts.created = missing.len();

        if !missing.is_empty() {
            self.store.insert_accounts(missing.clone()).await?;
            for account in self.store.list_accounts(company_id).await? {
                by_number.insert(account.number.clone(), account);
            }
            outcome.created_ids.accounts = missing
                .iter()
                .filter(|a| by_number.get(&a.number).is_some_and(|s| s.id == a.id))
                .map(|a| (a.number.clone(), a.id))
                .collect();
        }

        info!(
            company_id = %company_id,
            created = outcome.accounts.created,
            existing = outcome.accounts.existing,
            "Accounts phase complete"
        );
        Ok(by_number)
    }

    async fn import_entries(
        &self,
        ctx: &GroupContext<'_>,
        plan: &ImportPlan,
        cancel: &CancellationToken,
        outcome: &mut ImportOutcome,
    ) -> Result<(), StoreError> {
        let mut slots: Vec<Option<RowOutcome>> = vec![None; plan.keys.len()];
        let mut errors: Vec<ImportRowError> = plan.rejected.clone();

        for rejected in &plan.rejected {
            slots[rejected.row] = Some(row_outcome(
                plan,
                rejected.row,
                RowStatus::Error,
                Some(rejected.message.clone()),
            ));
        }

        let workers = self.config.import_workers.max(1);
        let mut results = stream::iter(&plan.groups)
            .map(|group| async move {
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                self.import_group(ctx, group).await.map(Some)
            })
            .buffer_unordered(workers);

        while let Some(result) = results.next().await {
            let Some(group) = result? else {
                outcome.cancelled = true;
                continue;
            };
            if let Some(entry_id) = group.entry_id {
                outcome.entries.created += 1;
                outcome.created_ids.entries.push(entry_id);
            }
            if group.existing {
                outcome.entries.existing += 1;
            }
            outcome.lines_created += group.lines_created;
            errors.extend(group.errors);
            for row in group.rows {
                let index = row.row;
                slots[index] = Some(row);
            }
        }

        errors.sort_by_key(|e| e.row);
        outcome.entries.errors = errors;
        outcome.rows = slots
            .into_iter()
            .enumerate()
            .map(|(row, slot)| {
                slot.unwrap_or_else(|| {
                    row_outcome(plan, row, RowStatus::Skipped, Some("Import cancelled".into()))
                })
            })
            .collect();
        outcome.counts = ImportCounts::from_rows(&outcome.rows);

        if outcome.cancelled {
            warn!(
                company_id = %ctx.company_id,
                entries = outcome.entries.created,
                "Import cancelled, remaining groups not processed"
            );
        }
        info!(
            company_id = %ctx.company_id,
            created = outcome.entries.created,
            existing = outcome.entries.existing,
            errors = outcome.entries.errors.len(),
            "Entries phase complete"
        );
        Ok(())
    }

    async fn import_group(
        &self,
        ctx: &GroupContext<'_>,
        group: &EntryGroup,
    ) -> Result<GroupResult, StoreError> {
        let mut result = GroupResult::default();

        let Some(&journal_id) = ctx.journals.get(&group.journal_code) else {
            let message = format!("Journal {} could not be resolved", group.journal_code);
            for line in &group.lines {
                result.fail(group, line.row, "UNKNOWN_JOURNAL", message.clone());
            }
            return Ok(result);
        };

        if self
            .store
            .find_entry(ctx.company_id, journal_id, &group.entry_number)
            .await?
            .is_some()
        {
            result.skip_existing(group);
            return Ok(result);
        }

        let mut resolved: Vec<(&PlannedLine, &Account)> = Vec::with_capacity(group.lines.len());
        for line in &group.lines {
            match ctx.accounts.get(&line.account_number) {
                Some(account) if account.is_active => resolved.push((line, account)),
                Some(_) => {
                    let message = format!("Account {} is inactive", line.account_number);
                    result.fail(group, line.row, "ACCOUNT_INACTIVE", message);
                }
                None => {
                    let message = format!(
                        "Account {} does not exist and cannot be created",
                        line.account_number
                    );
                    result.fail(group, line.row, "UNKNOWN_ACCOUNT", message);
                }
            }
        }
        if resolved.is_empty() {
            return Ok(result);
        }

        let Some(totals) = EntryGroup::totals(resolved.iter().map(|(line, _)| *line)) else {
            let message = "Entry totals are out of range".to_string();
            for (line, _) in &resolved {
                result.fail(group, line.row, "INVALID_AMOUNT", message.clone());
            }
            return Ok(result);
        };
        let unbalanced = (!totals.is_balanced(self.config.tolerance)).then(|| {
            format!(
                "Entry is not balanced (debit {}, credit {})",
                totals.debit, totals.credit
            )
        });

        let entry = JournalEntry {
            id: EntryId::new(),
            company_id: ctx.company_id,
            journal_id,
            entry_number: group.entry_number.clone(),
            date: group.date,
            description: group.description.clone(),
            reference: group.reference.clone(),
            status: ctx.status,
            locked: ctx.status == EntryStatus::Posted,
            created_at: Utc::now(),
        };
        let entry_id = entry.id;

        match self.store.insert_entry(entry).await {
            Ok(()) => result.entry_id = Some(entry_id),
            Err(StoreError::Duplicate(_)) => {
                result.skip_existing(group);
                return Ok(result);
            }
            Err(err) if err.is_unavailable() => return Err(err),
            Err(err) => {
                for (line, _) in &resolved {
                    result.fail(group, line.row, err.error_code(), err.to_string());
                }
                return Ok(result);
            }
        }

        let batch_size = self.config.import_batch_size.max(1);
        for chunk in resolved.chunks(batch_size) {
            let lines: Vec<EntryLine> = chunk
                .iter()
                .map(|(line, account)| EntryLine {
                    id: EntryLineId::new(),
                    entry_id,
                    account_id: account.id,
                    debit: line.debit,
                    credit: line.credit,
                    currency: line
                        .currency
                        .clone()
                        .unwrap_or_else(|| account.currency.clone()),
                    label: line.label.clone(),
                })
                .collect();

            match self.store.insert_lines(lines).await {
                Ok(()) => {
                    result.lines_created += chunk.len();
                    for (line, _) in chunk {
                        let message = line.warning.clone().or_else(|| unbalanced.clone());
                        let status = if message.is_some() {
                            RowStatus::Warning
                        } else {
                            RowStatus::Success
                        };
                        result.push(group, line.row, status, message);
                    }
                }
                Err(err) => {
                    let first_row = chunk.first().map_or(0, |(line, _)| line.row);
                    warn!(
                        entry_number = %group.entry_number,
                        journal = %group.journal_code,
                        row = first_row,
                        lines = chunk.len(),
                        error = %err,
                        "Line chunk failed"
                    );
                    result.errors.push(ImportRowError::new(
                        first_row,
                        "CHUNK_FAILED",
                        format!("{} lines not written: {err}", chunk.len()),
                    ));
                    for (line, _) in chunk {
                        result.push(
                            group,
                            line.row,
                            RowStatus::Error,
                            Some(format!("Line not written: {err}")),
                        );
                    }
                }
            }
        }

        debug!(
            entry_number = %group.entry_number,
            journal = %group.journal_code,
            lines = result.lines_created,
            "Entry imported"
        );
        Ok(result)
    }
}

impl GroupResult {
    fn push(&mut self, group: &EntryGroup, row: usize, status: RowStatus, message: Option<String>) {
        self.rows.push(RowOutcome {
            row,
            status,
            journal_code: group.journal_code.clone(),
            entry_number: group.entry_number.clone(),
            message,
        });
    }

    fn fail(&mut self, group: &EntryGroup, row: usize, code: &str, message: String) {
        self.errors.push(ImportRowError::new(row, code, message.clone()));
        self.push(group, row, RowStatus::Error, Some(message));
    }

    fn skip_existing(&mut self, group: &EntryGroup) {
        self.existing = true;
        for line in &group.lines {
            self.push(
                group,
                line.row,
                RowStatus::Skipped,
                Some("Entry already exists".to_string()),
            );
        }
    }
}

fn row_outcome(plan: &ImportPlan, row: usize, status: RowStatus, message: Option<String>) -> RowOutcome {
    let (journal_code, entry_number) = plan.keys.get(row).cloned().unwrap_or_default();
    RowOutcome {
        row,
        status,
        journal_code,
        entry_number,
        message,
    }
}
