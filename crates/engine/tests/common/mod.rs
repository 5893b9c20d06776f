//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use grandlivre_core::accounts::{Account, AccountRegistry};
use grandlivre_core::import::FecRow;
use grandlivre_core::ledger::{
    EntryDraft, EntryLine, Journal, JournalEntry, JournalType, LedgerLine, LineDraft,
};
use grandlivre_core::workflow::{EntryStatus, WorkflowEvent};
use grandlivre_engine::{LedgerEngine, LedgerStore, MemoryStore, StoreResult};
use grandlivre_shared::EngineConfig;
use grandlivre_shared::types::{AccountId, CompanyId, EntryId, JournalId};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine over a fresh memory store.
pub fn engine() -> (Arc<MemoryStore>, LedgerEngine) {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> (Arc<MemoryStore>, LedgerEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = LedgerEngine::new(store.clone(), config);
    (store, engine)
}

pub fn fec_row(
    journal: &str,
    number: &str,
    account: &str,
    debit: &str,
    credit: &str,
) -> FecRow {
    FecRow {
        journal_code: journal.to_string(),
        journal_lib: String::new(),
        entry_number: number.to_string(),
        entry_date: "20240115".to_string(),
        account_number: account.to_string(),
        account_lib: format!("Compte {account}"),
        piece_ref: format!("P-{number}"),
        entry_lib: format!("Ecriture {number}"),
        debit: debit.to_string(),
        credit: credit.to_string(),
        currency: None,
    }
}

pub fn account(company_id: CompanyId, number: &str) -> Account {
    let classification = AccountRegistry::classify(number);
    Account {
        id: AccountId::new(),
        company_id,
        number: number.to_string(),
        name: format!("Compte {number}"),
        class: classification.class,
        account_type: classification.account_type,
        currency: "EUR".to_string(),
        is_active: true,
    }
}

pub fn journal(company_id: CompanyId, code: &str, journal_type: JournalType) -> Journal {
    Journal {
        id: JournalId::new(),
        company_id,
        code: code.to_string(),
        name: format!("Journal {code}"),
        journal_type,
        is_active: true,
    }
}

/// A company with a sales journal and the accounts 411000 / 707000.
pub struct SalesBook {
    pub company_id: CompanyId,
    pub journal_id: JournalId,
    pub receivable: AccountId,
    pub sales: AccountId,
}

pub async fn sales_book(store: &MemoryStore) -> SalesBook {
    let company_id = CompanyId::new();
    let sales_journal = journal(company_id, "VT", JournalType::Sale);
    let receivable = account(company_id, "411000");
    let sales = account(company_id, "707000");
    let book = SalesBook {
        company_id,
        journal_id: sales_journal.id,
        receivable: receivable.id,
        sales: sales.id,
    };
    store.insert_journals(vec![sales_journal]).await.unwrap();
    store.insert_accounts(vec![receivable, sales]).await.unwrap();
    book
}

/// Draft of a sale: debit 411000, credit 707000.
pub fn sale_draft(book: &SalesBook, number: &str, on: NaiveDate, amount: Decimal) -> EntryDraft {
    EntryDraft {
        journal_id: book.journal_id,
        entry_number: number.to_string(),
        date: on,
        description: format!("Facture {number}"),
        reference: Some(format!("F-{number}")),
        lines: vec![
            LineDraft {
                account_id: book.receivable,
                debit: amount,
                credit: Decimal::ZERO,
                label: None,
            },
            LineDraft {
                account_id: book.sales,
                debit: Decimal::ZERO,
                credit: amount,
                label: None,
            },
        ],
    }
}

/// Creates a sale and walks it to `validated`.
pub async fn validated_sale(
    engine: &LedgerEngine,
    book: &SalesBook,
    number: &str,
    on: NaiveDate,
    amount: Decimal,
) -> EntryId {
    let entry = engine
        .create_entry(book.company_id, sale_draft(book, number, on, amount))
        .await
        .unwrap();
    assert!(engine.submit_for_review(entry.id, None).await.unwrap().success);
    assert!(engine.approve(entry.id, None).await.unwrap().success);
    entry.id
}

/// Memory store with hooks that simulate concurrent writers.
pub struct HookedStore {
    pub inner: Arc<MemoryStore>,
    /// When armed, the next status swap is preceded by another writer
    /// moving the entry to this status.
    pub race_to: Option<EntryStatus>,
    pub armed: AtomicBool,
    /// Cancels the token once this many entries were inserted.
    pub cancel_after: Option<(usize, CancellationToken)>,
    pub inserted: AtomicUsize,
}

impl HookedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            race_to: None,
            armed: AtomicBool::new(false),
            cancel_after: None,
            inserted: AtomicUsize::new(0),
        }
    }

    pub fn racing_to(mut self, status: EntryStatus) -> Self {
        self.race_to = Some(status);
        self.armed.store(true, Ordering::SeqCst);
        self
    }

    pub fn cancelling_after(mut self, entries: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((entries, token));
        self
    }
}

#[async_trait]
impl LedgerStore for HookedStore {
    async fn list_accounts(&self, company_id: CompanyId) -> StoreResult<Vec<Account>> {
        self.inner.list_accounts(company_id).await
    }

    async fn insert_accounts(&self, accounts: Vec<Account>) -> StoreResult<()> {
        self.inner.insert_accounts(accounts).await
    }

    async fn set_account_active(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
        active: bool,
    ) -> StoreResult<Account> {
        self.inner
            .set_account_active(company_id, account_id, active)
            .await
    }

    async fn list_journals(&self, company_id: CompanyId) -> StoreResult<Vec<Journal>> {
        self.inner.list_journals(company_id).await
    }

    async fn insert_journals(&self, journals: Vec<Journal>) -> StoreResult<()> {
        self.inner.insert_journals(journals).await
    }

    async fn find_entry(
        &self,
        company_id: CompanyId,
        journal_id: JournalId,
        entry_number: &str,
    ) -> StoreResult<Option<JournalEntry>> {
        self.inner
            .find_entry(company_id, journal_id, entry_number)
            .await
    }

    async fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<JournalEntry>> {
        self.inner.get_entry(entry_id).await
    }

    async fn list_entries(&self, company_id: CompanyId) -> StoreResult<Vec<JournalEntry>> {
        self.inner.list_entries(company_id).await
    }

    async fn insert_entry(&self, entry: JournalEntry) -> StoreResult<()> {
        self.inner.insert_entry(entry).await?;
        let inserted = self.inserted.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((limit, token)) = &self.cancel_after
            && inserted >= *limit
        {
            token.cancel();
        }
        Ok(())
    }

    async fn insert_entry_with_lines(
        &self,
        entry: JournalEntry,
        lines: Vec<EntryLine>,
    ) -> StoreResult<()> {
        self.inner.insert_entry_with_lines(entry, lines).await
    }

    async fn insert_lines(&self, lines: Vec<EntryLine>) -> StoreResult<()> {
        self.inner.insert_lines(lines).await
    }

    async fn entry_lines(&self, entry_id: EntryId) -> StoreResult<Vec<EntryLine>> {
        self.inner.entry_lines(entry_id).await
    }

    async fn replace_entry(
        &self,
        entry: JournalEntry,
        lines: Vec<EntryLine>,
        expected: EntryStatus,
    ) -> StoreResult<()> {
        self.inner.replace_entry(entry, lines, expected).await
    }

    async fn compare_and_set_status(
        &self,
        entry_id: EntryId,
        expected: EntryStatus,
        next: EntryStatus,
        lock: bool,
    ) -> StoreResult<JournalEntry> {
        if let Some(other) = self.race_to
            && self.armed.swap(false, Ordering::SeqCst)
        {
            self.inner
                .compare_and_set_status(entry_id, expected, other, false)
                .await?;
        }
        self.inner
            .compare_and_set_status(entry_id, expected, next, lock)
            .await
    }

    async fn record_event(&self, event: WorkflowEvent) -> StoreResult<()> {
        self.inner.record_event(event).await
    }

    async fn entry_events(&self, entry_id: EntryId) -> StoreResult<Vec<WorkflowEvent>> {
        self.inner.entry_events(entry_id).await
    }

    async fn ledger_lines(
        &self,
        company_id: CompanyId,
        statuses: &[EntryStatus],
        until: NaiveDate,
    ) -> StoreResult<Vec<LedgerLine>> {
        self.inner.ledger_lines(company_id, statuses, until).await
    }
}

/// Today, for tests that rely on the default period end.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
