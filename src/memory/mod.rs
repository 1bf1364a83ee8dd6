// src/memory/mod.rs — Request history persistence

pub mod schema;
pub mod store;
pub mod store_server;

use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;

use crate::infra::errors::AggregatorError;
pub use store::{
    HistoryLimit, HistoryRecord, NewHistoryRecord, SourceStatistics, StatisticsSummary, Store,
};
pub use store_server::{spawn_store_server, StoreHandle};

/// Durable, append-only log of generation events.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one record; returns the store-assigned id.
    async fn append(&self, record: NewHistoryRecord) -> Result<i64, AggregatorError>;

    async fn statistics(&self) -> Result<StatisticsSummary, AggregatorError>;

    async fn recent(&self, limit: HistoryLimit) -> Result<Vec<HistoryRecord>, AggregatorError>;

    /// Irreversibly delete every record.
    async fn clear(&self) -> Result<(), AggregatorError>;

    async fn count(&self) -> Result<u64, AggregatorError>;
}

/// Open (or create) the database at the given path.
pub fn open(path: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    // Enable WAL mode for better concurrent performance
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    schema::run_migrations(&conn)?;
    Ok(Store::new(conn))
}

/// Create an in-memory database (for testing).
pub fn open_in_memory() -> anyhow::Result<Store> {
    let conn = Connection::open_in_memory()?;
    schema::run_migrations(&conn)?;
    Ok(Store::new(conn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        let store = open(&path).unwrap();
        store
            .append(&NewHistoryRecord::new("q", "m", "a", 0.5))
            .unwrap();
        drop(store);

        // Reopening keeps the data and does not re-run migrations.
        let store = open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(schema::current_version(store.conn()).unwrap(), 1);
    }
}
