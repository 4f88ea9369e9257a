//! Integration tests for webhook-inspector-db
//!
//! Tests database operations with real SQLite in-memory database

use chrono::{Duration, Utc};
use sea_orm::ConnectionTrait;
use std::collections::{BTreeMap, HashSet};
use webhook_inspector_db::{
    connect, migrate, NewWebhook, PageLimit, PageRequest, RecordId, WebhookStore,
};

/// Helper to create a migrated store over a fresh in-memory database
async fn setup_store() -> WebhookStore {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    WebhookStore::new(db)
}

fn sample(pathname: &str) -> NewWebhook {
    let mut webhook = NewWebhook::new("POST", pathname, "127.0.0.1");
    webhook
        .headers
        .insert("content-type".to_string(), "application/json".to_string());
    webhook
}

async fn seed(store: &WebhookStore, count: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let model = store
            .insert(sample(&format!("/hook/{}", i)))
            .await
            .expect("Failed to insert");
        ids.push(model.id);
    }
    ids
}

fn limit(n: u64) -> PageLimit {
    PageLimit::new(n).unwrap()
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    assert!(migrate(&db).await.is_ok());
    assert!(matches!(
        db.get_database_backend(),
        sea_orm::DatabaseBackend::Sqlite
    ));
}

#[tokio::test]
async fn test_insert_and_find() {
    let store = setup_store().await;

    let mut webhook = sample("/stripe");
    webhook.content_type = Some("application/json".to_string());
    webhook.content_length = Some(7);
    webhook.query_params = Some(BTreeMap::from([("x".to_string(), "1".to_string())]));
    webhook.body = Some("{\n  \"a\": 1\n}".to_string());

    let inserted = store.insert(webhook).await.expect("Failed to insert");
    let id = RecordId::parse(&inserted.id).expect("Stored id is a UUID");
    assert!(id.timestamp_millis().is_some());

    let found = store
        .find(&id)
        .await
        .expect("Failed to query")
        .expect("Webhook not found");

    assert_eq!(found.method, "POST");
    assert_eq!(found.pathname, "/stripe");
    assert_eq!(found.ip, "127.0.0.1");
    assert_eq!(found.status_code, 200);
    assert_eq!(found.content_length, Some(7));
    assert_eq!(found.body.as_deref(), Some("{\n  \"a\": 1\n}"));
    assert_eq!(
        found.header_map().unwrap().get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        found.query_param_map().unwrap(),
        Some(BTreeMap::from([("x".to_string(), "1".to_string())]))
    );
}

#[tokio::test]
async fn test_find_missing_returns_none() {
    let store = setup_store().await;

    let found = store.find(&RecordId::generate()).await.expect("Failed to query");
    assert!(found.is_none());
}

#[tokio::test]
async fn test_insert_without_optional_fields() {
    let store = setup_store().await;

    let inserted = store
        .insert(NewWebhook::new("GET", "/ping", "unknown"))
        .await
        .expect("Bare request must be storable");

    let id = RecordId::parse(&inserted.id).unwrap();
    let found = store.find(&id).await.unwrap().expect("Webhook not found");

    assert_eq!(found.status_code, 200);
    assert_eq!(found.content_type, None);
    assert_eq!(found.content_length, None);
    assert_eq!(found.query_params, None);
    assert_eq!(found.body, None);
    assert!(found.header_map().unwrap().is_empty());
    assert_eq!(found.query_param_map().unwrap(), None);
}

#[tokio::test]
async fn test_delete_then_find() {
    let store = setup_store().await;
    let ids = seed(&store, 2).await;
    let id = RecordId::parse(&ids[0]).unwrap();

    assert!(store.delete(&id).await.expect("Failed to delete"));
    assert!(store.find(&id).await.expect("Failed to query").is_none());

    // Second delete finds nothing
    assert!(!store.delete(&id).await.expect("Failed to delete"));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_unknown_id() {
    let store = setup_store().await;

    let deleted = store
        .delete(&RecordId::generate())
        .await
        .expect("Failed to delete");
    assert!(!deleted);
}

#[tokio::test]
async fn test_empty_table_lists_nothing() {
    let store = setup_store().await;

    let page = store
        .list(&PageRequest::default())
        .await
        .expect("Failed to list");

    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let store = setup_store().await;
    let ids = seed(&store, 5).await;

    let page = store
        .list(&PageRequest::first(limit(10)))
        .await
        .expect("Failed to list");

    let listed: Vec<String> = page.items.iter().map(|s| s.id.clone()).collect();
    let mut expected = ids.clone();
    expected.reverse();

    assert_eq!(listed, expected);
    assert_eq!(page.items[0].pathname, "/hook/4");
}

#[tokio::test]
async fn test_limit_with_more_rows_returns_cursor() {
    let store = setup_store().await;
    seed(&store, 4).await;

    let page = store
        .list(&PageRequest::first(limit(3)))
        .await
        .expect("Failed to list");

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next_cursor.as_deref(), Some(page.items[2].id.as_str()));
}

#[tokio::test]
async fn test_limit_with_exact_rows_has_no_cursor() {
    let store = setup_store().await;
    seed(&store, 3).await;

    let page = store
        .list(&PageRequest::first(limit(3)))
        .await
        .expect("Failed to list");

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next_cursor, None);
}

#[tokio::test]
async fn test_full_walk_with_concurrent_inserts() {
    let store = setup_store().await;
    let original: HashSet<String> = seed(&store, 23).await.into_iter().collect();

    let mut seen = Vec::new();
    let mut request = PageRequest::first(limit(5));

    loop {
        let page = store.list(&request).await.expect("Failed to list");
        seen.extend(page.items.iter().map(|s| s.id.clone()));

        // Newer rows land ahead of the cursor and must not leak into later pages
        seed(&store, 2).await;

        match page.next_cursor {
            Some(cursor) => request = PageRequest::after(RecordId::parse(&cursor).unwrap(), limit(5)),
            None => break,
        }
    }

    let unique: HashSet<String> = seen.iter().cloned().collect();
    assert_eq!(seen.len(), 23);
    assert_eq!(unique, original);
}

#[tokio::test]
async fn test_deleted_cursor_is_still_a_valid_bound() {
    let store = setup_store().await;
    let ids = seed(&store, 6).await;

    let first = store
        .list(&PageRequest::first(limit(3)))
        .await
        .expect("Failed to list");
    let cursor = RecordId::parse(first.next_cursor.as_deref().unwrap()).unwrap();

    assert!(store.delete(&cursor).await.unwrap());

    let second = store
        .list(&PageRequest::after(cursor, limit(3)))
        .await
        .expect("Failed to list");

    let listed: Vec<&str> = second.items.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);
    assert_eq!(second.next_cursor, None);
}

#[tokio::test]
async fn test_insert_at_keeps_id_and_time_order_aligned() {
    let store = setup_store().await;
    let now = Utc::now();

    // Insert out of chronological order
    for days in [3, 10, 1, 7] {
        store
            .insert_at(sample("/backfill"), now - Duration::days(days))
            .await
            .expect("Failed to insert");
    }

    let page = store
        .list(&PageRequest::first(limit(10)))
        .await
        .expect("Failed to list");

    let times: Vec<_> = page.items.iter().map(|s| s.created_at).collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);
}

#[tokio::test]
async fn test_concurrent_inserts() {
    let store = setup_store().await;

    let mut handles = vec![];
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.insert(sample(&format!("/concurrent/{}", i))).await
        }));
    }

    for handle in handles {
        let result = handle.await.expect("Task panicked");
        assert!(result.is_ok());
    }

    assert_eq!(store.count().await.unwrap(), 10);
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let store = setup_store().await;
    seed(&store, 4).await;

    assert_eq!(store.clear().await.unwrap(), 4);
    assert_eq!(store.count().await.unwrap(), 0);
}
