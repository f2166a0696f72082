//! Storage concurrency tests: the click counter must not lose updates under
//! concurrent redirects for the same identifier.

mod common;

use std::sync::Arc;

use common::create_test_storage;
use lariat::storage::Storage;

#[tokio::test]
async fn concurrent_increments_are_lossless() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage.increment_clicks("abc123").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let link = storage.get("abc123").await.unwrap().unwrap();
    assert_eq!(link.clicks, 20);
}

#[tokio::test]
async fn increments_on_different_ids_do_not_interfere() {
    let storage = create_test_storage().await;
    storage
        .create_with_id("abc123", "https://example.com", None)
        .await
        .unwrap();
    storage
        .create_with_id("def456", "https://example.org", None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let storage = Arc::clone(&storage);
        let id = if i % 2 == 0 { "abc123" } else { "def456" };
        handles.push(tokio::spawn(async move {
            storage.increment_clicks(id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(storage.get("abc123").await.unwrap().unwrap().clicks, 5);
    assert_eq!(storage.get("def456").await.unwrap().unwrap().clicks, 5);
}
