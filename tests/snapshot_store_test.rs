//! Snapshot store behavior: round-trips, misses, schema drift.

use chrono::Utc;
use scoutscrape::snapshot::{PageSnapshot, SnapshotStore, hash_content, url_key};

fn sample_snapshot(url: &str) -> PageSnapshot {
    let h1 = vec!["Welcome".to_string()];
    let paragraphs = vec!["Hello world.".to_string()];
    let content_hash = hash_content(&h1, &[], &[], &paragraphs);
    PageSnapshot {
        url: url.to_string(),
        h1,
        h2: Vec::new(),
        h3: Vec::new(),
        word_count: 42,
        content_hash,
        paragraphs,
        image_count: 2,
        internal_link_count: 7,
        external_link_count: 1,
        captured_at: Utc::now(),
    }
}

#[tokio::test]
async fn put_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();

    let snapshot = sample_snapshot("https://example.com/pricing");
    let key = url_key(&snapshot.url);
    store.put(&key, &snapshot).await.unwrap();

    let loaded = store.get(&key).await.expect("snapshot should exist");
    assert_eq!(loaded, snapshot);
}

#[tokio::test]
async fn absent_key_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();
    assert!(store.get(&url_key("https://example.com/never-seen")).await.is_none());
}

#[tokio::test]
async fn corrupt_record_is_a_miss_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();

    let key = url_key("https://example.com/old");
    tokio::fs::write(dir.path().join(format!("{key}.json")), b"{\"old_shape\": true}")
        .await
        .unwrap();

    assert!(store.get(&key).await.is_none());
}

#[tokio::test]
async fn put_overwrites_previous_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();

    let key = url_key("https://example.com/pricing");
    let first = sample_snapshot("https://example.com/pricing");
    store.put(&key, &first).await.unwrap();

    let mut second = sample_snapshot("https://example.com/pricing");
    second.word_count = 500;
    store.put(&key, &second).await.unwrap();

    let loaded = store.get(&key).await.unwrap();
    assert_eq!(loaded.word_count, 500);
}

#[tokio::test]
async fn distinct_urls_use_distinct_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();

    let a = sample_snapshot("https://example.com/a");
    let b = sample_snapshot("https://example.com/b");
    store.put(&url_key(&a.url), &a).await.unwrap();
    store.put(&url_key(&b.url), &b).await.unwrap();

    assert_eq!(store.get(&url_key(&a.url)).await.unwrap().url, a.url);
    assert_eq!(store.get(&url_key(&b.url)).await.unwrap().url, b.url);
}
