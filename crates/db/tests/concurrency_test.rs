//! Concurrent units of work against one database.
//!
//! - Concurrent number allocations never hand out the same number
//! - A failed unit leaves neither its writes nor its numbers behind

use std::collections::HashSet;

use chrono::NaiveDate;
use futures::future::join_all;
use tally_core::document::DocumentKind;
use tally_db::{Database, SequenceRepository, StoreError};

fn march() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

async fn allocate(db: &Database, kind: DocumentKind, prefix: &str) -> Result<String, StoreError> {
    let txn = db.begin().await?;
    let number = SequenceRepository::next_document_number(&txn, kind, prefix, march()).await?;
    Database::commit(txn).await?;
    Ok(number)
}

#[tokio::test]
async fn test_concurrent_allocations_are_distinct() {
    let db = Database::in_memory().await.unwrap();

    let tasks = (0..50).map(|_| {
        let db = db.clone();
        async move {
            allocate(&db, DocumentKind::CashReceipt, "CR")
                .await
                .unwrap()
        }
    });
    let numbers = join_all(tasks).await;

    let unique: HashSet<&String> = numbers.iter().collect();
    assert_eq!(unique.len(), 50);
    assert!(unique.contains(&"CR-202603-0001".to_string()));
    assert!(unique.contains(&"CR-202603-0050".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_allocations_are_distinct() {
    let db = Database::in_memory().await.unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move { allocate(&db, DocumentKind::CashPayment, "CP").await })
        })
        .collect();

    let mut numbers = HashSet::new();
    for handle in handles {
        numbers.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(numbers.len(), 20);
}

#[tokio::test]
async fn test_rolled_back_allocation_leaves_no_gap() {
    let db = Database::in_memory().await.unwrap();

    let txn = db.begin().await.unwrap();
    let abandoned =
        SequenceRepository::next_document_number(&txn, DocumentKind::CashTransfer, "CT", march())
            .await
            .unwrap();
    assert_eq!(abandoned, "CT-202603-0001");
    txn.rollback().await.unwrap();

    let next = allocate(&db, DocumentKind::CashTransfer, "CT").await.unwrap();
    assert_eq!(next, "CT-202603-0001");
}
