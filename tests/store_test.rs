// tests/store_test.rs — Integration test: SQLite history store

mod common;

use aggregator::memory::schema;
use aggregator::memory::{
    self, HistoryLimit, HistoryStore, NewHistoryRecord, SourceStatistics, Store,
};
use pretty_assertions::assert_eq;
use rusqlite::Connection;

/// Create an in-memory SQLite store with schema applied.
fn test_store() -> Store {
    let conn = Connection::open_in_memory().unwrap();
    schema::run_migrations(&conn).unwrap();
    Store::new(conn)
}

fn append(store: &Store, question: &str, model: &str, duration: f64) -> i64 {
    store
        .append(&NewHistoryRecord::new(question, model, "answer", duration))
        .unwrap()
}

#[test]
fn test_statistics_grouping_and_order() {
    let store = test_store();
    append(&store, "q1", "model-b", 1.0);
    append(&store, "q1", "model-b", 3.0);
    append(&store, "q1", "judge", 0.1);
    append(&store, "q2", "model-a", 2.0);
    append(&store, "q2", "model-a", 2.0);
    append(&store, "q2", "model-b", 2.0);

    let summary = store.statistics().unwrap();
    assert_eq!(
        summary.statistics,
        vec![
            SourceStatistics {
                model_name: "model-b".into(),
                request_count: 3,
                avg_duration: 2.0,
                min_duration: 1.0,
                max_duration: 3.0,
            },
            SourceStatistics {
                model_name: "model-a".into(),
                request_count: 2,
                avg_duration: 2.0,
                min_duration: 2.0,
                max_duration: 2.0,
            },
            SourceStatistics {
                model_name: "judge".into(),
                request_count: 1,
                avg_duration: 0.1,
                min_duration: 0.1,
                max_duration: 0.1,
            },
        ]
    );
    assert_eq!(summary.total_requests, 6);
}

#[test]
fn test_statistics_ties_are_stable() {
    let store = test_store();
    for model in ["zeta", "alpha", "mid"] {
        append(&store, "q", model, 1.0);
    }
    let first = store.statistics().unwrap();
    let names: Vec<&str> = first
        .statistics
        .iter()
        .map(|s| s.model_name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    assert_eq!(store.statistics().unwrap(), first);
}

#[test]
fn test_counts_sum_to_total_records() {
    let store = test_store();
    for i in 0..17 {
        let model = ["a", "b", "judge"][i % 3];
        append(&store, &format!("q{i}"), model, i as f64 / 10.0);
    }
    let summary = store.statistics().unwrap();
    let sum: u64 = summary.statistics.iter().map(|s| s.request_count).sum();
    assert_eq!(sum, summary.total_requests);
    assert_eq!(sum, store.count().unwrap());
}

#[test]
fn test_recent_newest_first_and_limited() {
    let store = test_store();
    for i in 0..5 {
        append(&store, &format!("q{i}"), "m", 1.0);
    }

    let limit = HistoryLimit::new(3, 1000).unwrap();
    let rows = store.recent(limit).unwrap();
    let questions: Vec<&str> = rows.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, vec!["q4", "q3", "q2"]);
    assert!(rows.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    // Idempotent with no intervening writes.
    assert_eq!(store.recent(limit).unwrap(), rows);
}

#[test]
fn test_recent_limit_larger_than_table() {
    let store = test_store();
    append(&store, "only", "m", 1.0);
    let rows = store.recent(HistoryLimit::new(50, 1000).unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].question, "only");
    assert_eq!(rows[0].answer, "answer");
}

#[test]
fn test_clear_then_statistics_is_empty() {
    let store = test_store();
    append(&store, "q", "a", 1.0);
    append(&store, "q", "judge", 0.1);

    store.clear().unwrap();
    let summary = store.statistics().unwrap();
    assert!(summary.statistics.is_empty());
    assert_eq!(summary.total_requests, 0);
    assert!(store.recent(HistoryLimit::default()).unwrap().is_empty());
}

#[test]
fn test_ids_not_reused_after_clear() {
    let store = test_store();
    let before = append(&store, "q", "a", 1.0);
    store.clear().unwrap();
    let after = append(&store, "q", "a", 1.0);
    assert!(after > before);
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.db");

    {
        let (handle, _join) = memory::spawn_store_server(memory::open(&path).unwrap());
        handle
            .append(NewHistoryRecord::new("persist me", "m", "a", 0.7))
            .await
            .unwrap();
    }

    let (handle, _join) = memory::spawn_store_server(memory::open(&path).unwrap());
    let rows = handle.recent(HistoryLimit::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].question, "persist me");
}

#[tokio::test]
async fn test_handle_clear_via_trait() {
    let handle = common::memory_store();
    let store: &dyn HistoryStore = &handle;
    store
        .append(NewHistoryRecord::new("q", "m", "a", 1.0))
        .await
        .unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.statistics().await.unwrap().total_requests, 0);
}
