//! Integration tests for entry workflow transitions.

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use common::{HookedStore, date, engine, sale_draft, sales_book, validated_sale};
use grandlivre_core::workflow::{EntryAction, EntryStatus};
use grandlivre_engine::{LedgerEngine, LedgerStore, MemoryStore};
use grandlivre_shared::EngineConfig;
use grandlivre_shared::types::EntryId;

async fn entry_in_review(engine: &LedgerEngine, store: &MemoryStore) -> EntryId {
    let book = sales_book(store).await;
    let entry = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "1", date(2024, 3, 15), dec!(1200)),
        )
        .await
        .unwrap();
    assert!(engine.submit_for_review(entry.id, None).await.unwrap().success);
    entry.id
}

#[tokio::test]
async fn test_reject_with_comment_returns_to_draft() {
    let (store, engine) = engine();
    let entry_id = entry_in_review(&engine, &store).await;

    let outcome = engine
        .reject(entry_id, Some("insufficient support".to_string()))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.status, EntryStatus::Draft);
    assert!(outcome.message.contains("rejected"));
    assert!(outcome.message.contains("insufficient support"));

    let entry = store.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(entry.status, EntryStatus::Draft);

    let history = engine.entry_history(entry_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action, EntryAction::Reject);
    assert_eq!(history[1].comment.as_deref(), Some("insufficient support"));
}

#[tokio::test]
async fn test_reject_without_comment_keeps_status() {
    let (store, engine) = engine();
    let entry_id = entry_in_review(&engine, &store).await;

    for comment in [None, Some("   ".to_string())] {
        let outcome = engine.reject(entry_id, comment).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.code.as_deref(), Some("REJECTION_COMMENT_REQUIRED"));
        assert_eq!(outcome.status, EntryStatus::Review);
    }

    let entry = store.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(entry.status, EntryStatus::Review);
    assert_eq!(engine.entry_history(entry_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_full_lifecycle_locks_posted_entry() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    let entry_id = validated_sale(&engine, &book, "1", date(2024, 3, 15), dec!(1200)).await;

    assert_eq!(
        engine.available_actions(entry_id).await.unwrap(),
        vec![EntryAction::Post, EntryAction::Reject]
    );

    let outcome = engine.post(entry_id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.status, EntryStatus::Posted);

    let entry = store.get_entry(entry_id).await.unwrap().unwrap();
    assert!(entry.locked);
    assert!(engine.available_actions(entry_id).await.unwrap().is_empty());

    let refused = engine
        .reject(entry_id, Some("too late".to_string()))
        .await
        .unwrap();
    assert!(!refused.success);
    assert_eq!(refused.code.as_deref(), Some("CANNOT_MODIFY_POSTED"));

    let err = engine
        .update_entry(entry_id, sale_draft(&book, "1", date(2024, 3, 15), dec!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CANNOT_MODIFY_POSTED");

    assert_eq!(engine.entry_history(entry_id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_validated_entry_can_be_rejected_and_resubmitted() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    let entry_id = validated_sale(&engine, &book, "1", date(2024, 3, 15), dec!(80)).await;

    let outcome = engine
        .reject(entry_id, Some("wrong VAT rate".to_string()))
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.status, EntryStatus::Draft);
    assert_eq!(
        engine.available_actions(entry_id).await.unwrap(),
        vec![EntryAction::Submit]
    );

    assert!(engine.submit_for_review(entry_id, None).await.unwrap().success);
}

#[tokio::test]
async fn test_invalid_transition_is_a_failed_outcome() {
    let (store, engine) = engine();
    let book = sales_book(&store).await;
    let entry = engine
        .create_entry(
            book.company_id,
            sale_draft(&book, "1", date(2024, 3, 15), dec!(10)),
        )
        .await
        .unwrap();

    let outcome = engine.post(entry.id).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.code.as_deref(), Some("INVALID_TRANSITION"));
    assert_eq!(outcome.status, EntryStatus::Draft);
}

#[tokio::test]
async fn test_unknown_entry_is_an_error() {
    let (_store, engine) = engine();
    let err = engine.approve(EntryId::new(), None).await.unwrap_err();
    assert_eq!(err.error_code(), "ENTRY_NOT_FOUND");
}

#[tokio::test]
async fn test_store_outage_propagates() {
    let (store, engine) = engine();
    let entry_id = entry_in_review(&engine, &store).await;
    store.set_offline(true);

    let err = engine.approve(entry_id, None).await.unwrap_err();
    assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
}

#[tokio::test]
async fn test_stale_status_loses_compare_and_swap() {
    let (memory, setup) = engine();
    let entry_id = entry_in_review(&setup, &memory).await;

    let hooked = Arc::new(HookedStore::new(memory.clone()).racing_to(EntryStatus::Draft));
    let engine = LedgerEngine::new(hooked, EngineConfig::default());

    let outcome = engine.approve(entry_id, None).await.unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.code.as_deref(), Some("STATUS_CONFLICT"));
    assert_eq!(outcome.status, EntryStatus::Draft);
    let entry = memory.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(entry.status, EntryStatus::Draft);
    assert_eq!(engine.entry_history(entry_id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_only_one_wins() {
    let (store, engine) = engine();
    let entry_id = entry_in_review(&engine, &store).await;
    let engine = Arc::new(engine);

    let approvers = 8;
    let barrier = Arc::new(Barrier::new(approvers));
    let mut handles = Vec::with_capacity(approvers);
    for _ in 0..approvers {
        let engine = Arc::clone(&engine);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine.approve(entry_id, None).await.unwrap()
        }));
    }

    let outcomes: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(outcomes.iter().filter(|o| o.success).count(), 1);
    for failed in outcomes.iter().filter(|o| !o.success) {
        let code = failed.code.as_deref().unwrap();
        assert!(code == "STATUS_CONFLICT" || code == "INVALID_TRANSITION");
    }

    let entry = store.get_entry(entry_id).await.unwrap().unwrap();
    assert_eq!(entry.status, EntryStatus::Validated);
    assert_eq!(engine.entry_history(entry_id).await.unwrap().len(), 2);
}
