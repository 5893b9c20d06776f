//! In-memory [`LedgerStore`] implementation.
//!
//! All state sits behind one `RwLock`, so every trait call is atomic.
//! Failure knobs let tests take the store offline, refuse one operation,
//! or reject line inserts for chosen entries.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::{DashMap, DashSet};
use tokio::sync::RwLock;

use grandlivre_core::accounts::Account;
use grandlivre_core::ledger::{EntryLine, Journal, JournalEntry, LedgerLine};
use grandlivre_core::workflow::{EntryStatus, WorkflowEvent};
use grandlivre_shared::types::{AccountId, CompanyId, EntryId, JournalId};

use crate::store::{LedgerStore, StoreError, StoreResult};

/// Store operations, used to target failure injection and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// [`LedgerStore::list_accounts`].
    ListAccounts,
    /// [`LedgerStore::insert_accounts`].
    InsertAccounts,
    /// [`LedgerStore::set_account_active`].
    SetAccountActive,
    /// [`LedgerStore::list_journals`].
    ListJournals,
    /// [`LedgerStore::insert_journals`].
    InsertJournals,
    /// [`LedgerStore::find_entry`].
    FindEntry,
    /// [`LedgerStore::get_entry`].
    GetEntry,
    /// [`LedgerStore::list_entries`].
    ListEntries,
    /// [`LedgerStore::insert_entry`].
    InsertEntry,
    /// [`LedgerStore::insert_entry_with_lines`].
    InsertEntryWithLines,
    /// [`LedgerStore::insert_lines`].
    InsertLines,
    /// [`LedgerStore::entry_lines`].
    EntryLines,
    /// [`LedgerStore::replace_entry`].
    ReplaceEntry,
    /// [`LedgerStore::compare_and_set_status`].
    CompareAndSetStatus,
    /// [`LedgerStore::record_event`].
    RecordEvent,
    /// [`LedgerStore::entry_events`].
    EntryEvents,
    /// [`LedgerStore::ledger_lines`].
    LedgerLines,
}

impl StoreOp {
    /// Returns the snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListAccounts => "list_accounts",
            Self::InsertAccounts => "insert_accounts",
            Self::SetAccountActive => "set_account_active",
            Self::ListJournals => "list_journals",
            Self::InsertJournals => "insert_journals",
            Self::FindEntry => "find_entry",
            Self::GetEntry => "get_entry",
            Self::ListEntries => "list_entries",
            Self::InsertEntry => "insert_entry",
            Self::InsertEntryWithLines => "insert_entry_with_lines",
            Self::InsertLines => "insert_lines",
            Self::EntryLines => "entry_lines",
            Self::ReplaceEntry => "replace_entry",
            Self::CompareAndSetStatus => "compare_and_set_status",
            Self::RecordEvent => "record_event",
            Self::EntryEvents => "entry_events",
            Self::LedgerLines => "ledger_lines",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Default)]
struct State {
    accounts: Vec<Account>,
    journals: Vec<Journal>,
    entries: HashMap<EntryId, JournalEntry>,
    lines: Vec<EntryLine>,
    events: Vec<WorkflowEvent>,
}

impl State {
    fn has_entry_number(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        entry_number: &str,
        except: Option<EntryId>,
    ) -> bool {
        self.entries.values().any(|e| {
            e.company_id == company_id
                && e.journal_id == journal_id
                && e.entry_number == entry_number
                && Some(e.id) != except
        })
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    offline: AtomicBool,
    failing_ops: DashSet<StoreOp>,
    failing_entry_numbers: DashSet<String>,
    calls: DashMap<StoreOp, usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with `StoreError::Unavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes one operation fail with `StoreError::Unavailable`.
    pub fn fail_on(&self, op: StoreOp) {
        self.failing_ops.insert(op);
    }

    /// Rejects line inserts that touch an entry with this number.
    pub fn reject_lines_for(&self, entry_number: &str) {
        self.failing_entry_numbers.insert(entry_number.to_string());
    }

    /// Clears every failure knob.
    pub fn heal(&self) {
        self.set_offline(false);
        self.failing_ops.clear();
        self.failing_entry_numbers.clear();
    }

    /// Number of times `op` was called, failed calls included.
    #[must_use]
    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls.get(&op).map_or(0, |count| *count)
    }

    /// Total number of stored lines.
    pub async fn line_count(&self) -> usize {
        self.state.read().await.lines.len()
    }

    fn enter(&self, op: StoreOp) -> StoreResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        if self.failing_ops.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op} is unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn list_accounts(&self, company_id: CompanyId) -> StoreResult<Vec<Account>> {
        self.enter(StoreOp::ListAccounts)?;
        let state = self.state.read().await;
        Ok(state
            .accounts
            .iter()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn insert_accounts(&self, accounts: Vec<Account>) -> StoreResult<()> {
        self.enter(StoreOp::InsertAccounts)?;
        let mut state = self.state.write().await;
        for account in accounts {
            let exists = state
                .accounts
                .iter()
                .any(|a| a.company_id == account.company_id && a.number == account.number);
            if !exists {
                state.accounts.push(account);
            }
        }
        Ok(())
    }

    async fn set_account_active(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        active: bool,
    ) -> StoreResult<Account> {
        self.enter(StoreOp::SetAccountActive)?;
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.company_id == company_id && a.id == account_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {account_id}")))?;
        account.is_active = active;
        Ok(account.clone())
    }

    async fn list_journals(&self, company_id: CompanyId) -> StoreResult<Vec<Journal>> {
        self.enter(StoreOp::ListJournals)?;
        let state = self.state.read().await;
        Ok(state
            .journals
            .iter()
            .filter(|j| j.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn insert_journals(&self, journals: Vec<Journal>) -> StoreResult<()> {
        self.enter(StoreOp::InsertJournals)?;
        let mut state = self.state.write().await;
        for journal in journals {
            let exists = state
                .journals
                .iter()
                .any(|j| j.company_id == journal.company_id && j.code == journal.code);
            if !exists {
                state.journals.push(journal);
            }
        }
        Ok(())
    }

    async fn find_entry(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        entry_number: &str,
    ) -> StoreResult<Option<JournalEntry>> {
        self.enter(StoreOp::FindEntry)?;
        let state = self.state.read().await;
        Ok(state
            .entries
            .values()
            .find(|e| {
                e.company_id == company_id
                    && e.journal_id == journal_id
                    && e.entry_number == entry_number
            })
            .cloned())
    }

    async fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<JournalEntry>> {
        self.enter(StoreOp::GetEntry)?;
        Ok(self.state.read().await.entries.get(&entry_id).cloned())
    }

    async fn list_entries(&self, company_id: CompanyId) -> StoreResult<Vec<JournalEntry>> {
        self.enter(StoreOp::ListEntries)?;
        let state = self.state.read().await;
        let mut entries: Vec<JournalEntry> = state
            .entries
            .values()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn insert_entry(&self, entry: JournalEntry) -> StoreResult<()> {
        self.enter(StoreOp::InsertEntry)?;
        let mut state = self.state.write().await;
        if state.has_entry_number(entry.company_id, entry.journal_id, &entry.entry_number, None) {
            return Err(StoreError::Duplicate(format!(
                "entry {} already exists in journal {}",
                entry.entry_number, entry.journal_id
            )));
        }
        state.entries.insert(entry.id, entry);
        Ok(())
    }

    async fn insert_entry_with_lines(
        &self,
        entry: JournalEntry,
        lines: Vec<EntryLine>,
    ) -> StoreResult<()> {
        self.enter(StoreOp::InsertEntryWithLines)?;
        let mut state = self.state.write().await;
        if state.has_entry_number(entry.company_id, entry.journal_id, &entry.entry_number, None) {
            return Err(StoreError::Duplicate(format!(
                "entry {} already exists in journal {}",
                entry.entry_number, entry.journal_id
            )));
        }
        if !lines.is_empty() && self.failing_entry_numbers.contains(&entry.entry_number) {
            return Err(StoreError::Rejected(format!(
                "line insert refused for entry {}",
                entry.entry_number
            )));
        }
        state.entries.insert(entry.id, entry);
        state.lines.extend(lines);
        Ok(())
    }

    async fn insert_lines(&self, lines: Vec<EntryLine>) -> StoreResult<()> {
        self.enter(StoreOp::InsertLines)?;
        let mut state = self.state.write().await;

        let entry_ids: HashSet<EntryId> = lines.iter().map(|l| l.entry_id).collect();
        for entry_id in entry_ids {
            let entry = state
                .entries
                .get(&entry_id)
                .ok_or_else(|| StoreError::NotFound(format!("entry {entry_id}")))?;
            if self.failing_entry_numbers.contains(&entry.entry_number) {
                return Err(StoreError::Rejected(format!(
                    "line insert refused for entry {}",
                    entry.entry_number
                )));
            }
        }

        state.lines.extend(lines);
        Ok(())
    }

    async fn entry_lines(&self, entry_id: EntryId) -> StoreResult<Vec<EntryLine>> {
        self.enter(StoreOp::EntryLines)?;
        let state = self.state.read().await;
        Ok(state
            .lines
            .iter()
            .filter(|l| l.entry_id == entry_id)
            .cloned()
            .collect())
    }

    async fn replace_entry(
        &self,
        entry: JournalEntry,
        lines: Vec<EntryLine>,
        expected: EntryStatus,
    ) -> StoreResult<()> {
        self.enter(StoreOp::ReplaceEntry)?;
        let mut state = self.state.write().await;

        let actual = state
            .entries
            .get(&entry.id)
            .map(|e| e.status)
            .ok_or_else(|| StoreError::NotFound(format!("entry {}", entry.id)))?;
        if actual != expected {
            return Err(StoreError::StatusConflict { expected, actual });
        }
        if state.has_entry_number(
            entry.company_id,
            entry.journal_id,
            &entry.entry_number,
            Some(entry.id),
        ) {
            return Err(StoreError::Duplicate(format!(
                "entry {} already exists in journal {}",
                entry.entry_number, entry.journal_id
            )));
        }

        let entry_id = entry.id;
        state.lines.retain(|l| l.entry_id != entry_id);
        state.lines.extend(lines);
        state.entries.insert(entry_id, entry);
        Ok(())
    }

    async fn compare_and_set_status(
        &self,
        entry_id: EntryId,
        expected: EntryStatus,
        next: EntryStatus,
        lock: bool,
    ) -> StoreResult<JournalEntry> {
        self.enter(StoreOp::CompareAndSetStatus)?;
        let mut state = self.state.write().await;
        let entry = state
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| StoreError::NotFound(format!("entry {entry_id}")))?;

        if entry.status != expected {
            return Err(StoreError::StatusConflict {
                expected,
                actual: entry.status,
            });
        }

        entry.status = next;
        entry.locked |= lock;
        Ok(entry.clone())
    }

    async fn record_event(&self, event: WorkflowEvent) -> StoreResult<()> {
        self.enter(StoreOp::RecordEvent)?;
        self.state.write().await.events.push(event);
        Ok(())
    }

    async fn entry_events(&self, entry_id: EntryId) -> StoreResult<Vec<WorkflowEvent>> {
        self.enter(StoreOp::EntryEvents)?;
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|e| e.entry_id == entry_id)
            .cloned()
            .collect())
    }

    async fn ledger_lines(
        &self,
        company_id: CompanyId,
        statuses: &[EntryStatus],
        until: NaiveDate,
    ) -> StoreResult<Vec<LedgerLine>> {
        self.enter(StoreOp::LedgerLines)?;
        let state = self.state.read().await;

        let accounts: HashMap<AccountId, &Account> = state
            .accounts
            .iter()
            .filter(|a| a.company_id == company_id)
            .map(|a| (a.id, a))
            .collect();

        Ok(state
            .lines
            .iter()
            .filter_map(|line| {
                let entry = state.entries.get(&line.entry_id)?;
                if entry.company_id != company_id
                    || entry.date > until
                    || !statuses.contains(&entry.status)
                {
                    return None;
                }
                let account = accounts.get(&line.account_id)?;
                Some(LedgerLine {
                    account_id: account.id,
                    account_number: account.number.clone(),
                    account_name: account.name.clone(),
                    date: entry.date,
                    debit: line.debit,
                    credit: line.credit,
                })
            })
            .collect())
    }
}
