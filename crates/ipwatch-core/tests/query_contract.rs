//! Contract Test: Read-Only Queries
//!
//! Constraints verified:
//! - "No data" is distinguishable from data
//! - recent(n) returns up to n entries, most recent first
//! - Queries never write to the store

mod common;

use common::*;
use ipwatch_core::{FileHistoryStore, QueryService};
use std::num::NonZeroUsize;
use std::sync::Arc;

fn n(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap()
}

#[tokio::test]
async fn recent_returns_last_entries_newest_first() {
    // 8 entries, recent(5) → entries 8..4

    let entries: Vec<String> = (1..=8).map(|i| format!("10.0.0.{}", i)).collect();
    let pairs: Vec<(&str, Option<&str>)> = entries.iter().map(|ip| (ip.as_str(), None)).collect();
    let store = Arc::new(MockHistoryStore::new(history_of(&pairs)));
    let queries = QueryService::new(store.clone());

    let recent = queries.recent(n(5)).await.unwrap();

    let ips: Vec<&str> = recent.iter().map(|s| s.ipv4.as_str()).collect();
    assert_eq!(
        ips,
        vec!["10.0.0.8", "10.0.0.7", "10.0.0.6", "10.0.0.5", "10.0.0.4"]
    );
    assert_eq!(store.save_call_count(), 0);
}

#[tokio::test]
async fn recent_with_large_n_returns_everything() {
    let store = Arc::new(MockHistoryStore::new(history_of(&[
        ("1.1.1.1", None),
        ("2.2.2.2", Some("::2")),
    ])));
    let queries = QueryService::new(store);

    let recent = queries.recent(n(50)).await.unwrap();

    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].ipv4, "2.2.2.2");
}

#[tokio::test]
async fn empty_history_reports_no_data() {
    let store = Arc::new(MockHistoryStore::new(history_of(&[])));
    let queries = QueryService::new(store);

    assert_eq!(queries.latest().await.unwrap(), None);
    assert!(queries.recent(n(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn latest_is_last_appended() {
    let store = Arc::new(MockHistoryStore::new(history_of(&[
        ("1.1.1.1", None),
        ("2.2.2.2", Some("::2")),
    ])));
    let queries = QueryService::new(store);

    let latest = queries.latest().await.unwrap().expect("data present");
    assert_eq!(latest.ipv4, "2.2.2.2");
    assert_eq!(latest.ipv6.as_str(), "::2");
}

#[tokio::test]
async fn queries_on_missing_file_do_not_create_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("ip_history.json");
    let queries = QueryService::new(Arc::new(FileHistoryStore::new(&path)));

    assert_eq!(queries.latest().await.unwrap(), None);
    assert!(queries.recent(n(3)).await.unwrap().is_empty());

    assert!(!path.exists());
    assert!(!path.parent().unwrap().exists());
}

#[tokio::test]
async fn queries_leave_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ip_history.json");
    let history = history_of(&[("1.1.1.1", None), ("2.2.2.2", None)]);
    std::fs::write(&path, serde_json::to_string_pretty(&history).unwrap()).unwrap();
    let before = std::fs::read(&path).unwrap();

    let queries = QueryService::new(Arc::new(FileHistoryStore::new(&path)));
    queries.latest().await.unwrap();
    queries.recent(n(1)).await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn corrupt_file_is_an_error_not_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ip_history.json");
    std::fs::write(&path, "not json").unwrap();

    let queries = QueryService::new(Arc::new(FileHistoryStore::new(&path)));

    let err = queries.latest().await.unwrap_err();
    assert!(err.is_corrupt_state());
}
