//! Integration tests for interactive entry editing and account lifecycle.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{date, engine, fec_row, sale_draft, sales_book};
use grandlivre_core::import::RowStatus;
use grandlivre_core::ledger::LineDraft;
use grandlivre_core::workflow::EntryStatus;
use grandlivre_engine::{LedgerStore, StoreOp};
use grandlivre_shared::types::{AccountId, JournalId};

#[tokio::test]
async fn test_create_entry_writes_draft_and_lines() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    let entry = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "F1", date(2024, 4, 1), dec!(250)),
        )
        .await
        .unwrap();

    assert_eq!(entry.status, EntryStatus::Draft);
    assert!(!entry.locked);
    let lines = store.entry_lines(entry.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].debit, dec!(250));
    assert_eq!(lines[0].currency, "EUR");
}

#[tokio::test]
async fn test_create_entry_enforces_double_entry_rules() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    let mut unbalanced = sale_draft(&book, "1", date(2024, 4, 1), dec!(100));
    unbalanced.lines[1].credit = dec!(90);
    let err = engine
        .create_entry(book.company_id, unbalanced)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNBALANCED_ENTRY");

    let mut single = sale_draft(&book, "1", date(2024, 4, 1), dec!(100));
    single.lines.truncate(1);
    let err = engine.create_entry(book.company_id, single).await.unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_LINES");

    let mut both_sides = sale_draft(&book, "1", date(2024, 4, 1), dec!(100));
    both_sides.lines.push(LineDraft {
        account_id: book.sales,
        debit: dec!(5),
        credit: dec!(5),
        label: None,
    });
    let err = engine
        .create_entry(book.company_id, both_sides)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_LINE");

    assert_eq!(store.line_count().await, 0);
}

#[tokio::test]
async fn test_create_entry_rejects_out_of_range_totals() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    let mut huge = sale_draft(&book, "1", date(2024, 4, 1), Decimal::MAX);
    huge.lines.push(LineDraft {
        account_id: book.receivable,
        debit: dec!(1),
        credit: Decimal::ZERO,
        label: None,
    });
    let err = engine.create_entry(book.company_id, huge).await.unwrap_err();

    assert_eq!(err.error_code(), "AMOUNT_OVERFLOW");
    assert!(store.list_entries(book.company_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_line_write_leaves_no_header() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    store.reject_lines_for("F1");
    let draft = sale_draft(&book, "F1", date(2024, 4, 1), dec!(10));
    assert!(engine.create_entry(book.company_id, draft.clone()).await.is_err());
    store.heal();
    store.fail_on(StoreOp::InsertEntryWithLines);
    assert!(engine.create_entry(book.company_id, draft.clone()).await.is_err());
    store.heal();

    let found = store
        .find_entry(book.company_id, book.journal_id, "F1")
        .await
        .unwrap();
    assert!(found.is_none());
    assert_eq!(store.line_count().await, 0);

    let entry = engine.create_entry(book.company_id, draft).await.unwrap();
    assert_eq!(store.entry_lines(entry.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_entry_resolves_references() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    let mut unknown_account = sale_draft(&book, "1", date(2024, 4, 1), dec!(100));
    unknown_account.lines[0].account_id = AccountId::new();
    let err = engine
        .create_entry(book.company_id, unknown_account)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");

    let mut unknown_journal = sale_draft(&book, "1", date(2024, 4, 1), dec!(100));
    unknown_journal.journal_id = JournalId::new();
    let err = engine
        .create_entry(book.company_id, unknown_journal)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "JOURNAL_NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_entry_number_is_refused() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "F1", date(2024, 4, 1), dec!(10)),
        )
        .await
        .unwrap();

    let err = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "F1", date(2024, 4, 2), dec!(20)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_ENTRY");
    assert!(err.to_string().contains("VT"));
}

#[tokio::test]
async fn test_update_draft_replaces_lines() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    let entry = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "F1", date(2024, 4, 1), dec!(10)),
        )
        .await
        .unwrap();

    let updated = engine
        .update_entry(entry.id, sale_draft(&book, "F1", date(2024, 4, 3), dec!(75)))
        .await
        .unwrap();

    assert_eq!(updated.id, entry.id);
    assert_eq!(updated.date, date(2024, 4, 3));
    assert_eq!(updated.created_at, entry.created_at);
    let lines = store.entry_lines(entry.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.debit == dec!(75) || l.credit == dec!(75)));
}

#[tokio::test]
async fn test_update_outside_draft_is_refused() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    let entry = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "F1", date(2024, 4, 1), dec!(10)),
        )
        .await
        .unwrap();
    engine.submit_for_review(entry.id, None).await.unwrap();

    let err = engine
        .update_entry(entry.id, sale_draft(&book, "F1", date(2024, 4, 1), dec!(20)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ENTRY_NOT_EDITABLE");

    engine
        .reject(entry.id, Some("amount is wrong".to_string()))
        .await
        .unwrap();
    assert!(
        engine
            .update_entry(entry.id, sale_draft(&book, "F1", date(2024, 4, 1), dec!(20)))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_deactivated_account_refuses_new_lines() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    let account = engine
        .deactivate_account(book.company_id, book.sales)
        .await
        .unwrap();
    assert!(!account.is_active);

    let err = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "F1", date(2024, 4, 1), dec!(10)),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let outcome = engine
        .import_ledger(
            book.company_id,
            &[
                fec_row("VT", "2", "411000", "10", "0"),
                fec_row("VT", "2", "707000", "0", "10"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(outcome.rows[1].status, RowStatus::Error);
    assert_eq!(outcome.errors().next().unwrap().code, "ACCOUNT_INACTIVE");
    assert_eq!(store.list_accounts(book.company_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_deactivate_unknown_account() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;

    let err = engine
        .deactivate_account(book.company_id, AccountId::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn test_zero_lines_are_rejected_interactively() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    let draft = sale_draft(&book, "F1", date(2024, 4, 1), Decimal::ZERO);

    let err = engine.create_entry(book.company_id, draft).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_LINE");
}
