// src/memory/store.rs — SQLite operations on the request history

use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::infra::errors::AggregatorError;

/// Store-side timestamp format. Fixed width, so text order is time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Caller-supplied part of a history row; id and timestamp come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub question: String,
    pub model_name: String,
    pub answer: String,
    pub duration: f64,
}

impl NewHistoryRecord {
    pub fn new(
        question: impl Into<String>,
        model_name: impl Into<String>,
        answer: impl Into<String>,
        duration: f64,
    ) -> Self {
        Self {
            question: question.into(),
            model_name: model_name.into(),
            answer: answer.into(),
            duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub timestamp: String,
    pub question: String,
    pub model_name: String,
    pub answer: String,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatistics {
    pub model_name: String,
    pub request_count: u64,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub statistics: Vec<SourceStatistics>,
    pub total_requests: u64,
}

/// Validated row count for `recent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimit(u32);

impl HistoryLimit {
    pub const DEFAULT: u32 = 10;

    /// Non-positive requests are rejected; anything above `max` is clamped.
    pub fn new(requested: i64, max: u32) -> Result<Self, AggregatorError> {
        if requested <= 0 {
            return Err(AggregatorError::InvalidRequest(format!(
                "limit must be a positive integer, got {requested}"
            )));
        }
        let max = max.max(1);
        Ok(Self(requested.min(max as i64) as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Low-level SQLite operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Append one row. The timestamp never goes below the newest existing one,
    /// even if the wall clock steps backwards.
    pub fn append(&self, record: &NewHistoryRecord) -> anyhow::Result<i64> {
        if !record.duration.is_finite() || record.duration < 0.0 {
            anyhow::bail!(
                "duration must be a non-negative number, got {}",
                record.duration
            );
        }

        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        self.conn.execute(
            "INSERT INTO requests_history (timestamp, question, model_name, answer, duration)
             VALUES (
                (SELECT MAX(?1, COALESCE(MAX(timestamp), '')) FROM requests_history),
                ?2, ?3, ?4, ?5
             )",
            params![
                now,
                record.question,
                record.model_name,
                record.answer,
                record.duration
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Per-model aggregates, busiest first, ties by model name.
    pub fn statistics(&self) -> anyhow::Result<StatisticsSummary> {
        let mut stmt = self.conn.prepare(
            "SELECT model_name, COUNT(*) AS request_count, AVG(duration),
                    MIN(duration), MAX(duration)
             FROM requests_history
             GROUP BY model_name
             ORDER BY request_count DESC, model_name ASC",
        )?;
        let statistics = stmt
            .query_map([], |row| {
                Ok(SourceStatistics {
                    model_name: row.get(0)?,
                    request_count: row.get::<_, i64>(1)? as u64,
                    avg_duration: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                    min_duration: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                    max_duration: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total_requests = statistics.iter().map(|s| s.request_count).sum();
        Ok(StatisticsSummary {
            statistics,
            total_requests,
        })
    }

    /// Newest rows first.
    pub fn recent(&self, limit: HistoryLimit) -> anyhow::Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, question, model_name, answer, duration
             FROM requests_history
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit.get()], |row| {
                Ok(HistoryRecord {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    question: row.get(2)?,
                    model_name: row.get(3)?,
                    answer: row.get(4)?,
                    duration: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete every row.
    pub fn clear(&self) -> anyhow::Result<()> {
        let deleted = self.conn.execute("DELETE FROM requests_history", [])?;
        tracing::info!("Cleared {deleted} history records");
        Ok(())
    }

    pub fn count(&self) -> anyhow::Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM requests_history", [], |r| r.get(0))?;
        Ok(n as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::schema;

    fn test_store() -> Store {
        let conn = Connection::open_in_memory().unwrap();
        schema::run_migrations(&conn).unwrap();
        Store::new(conn)
    }

    #[test]
    fn test_limit_validation() {
        assert!(HistoryLimit::new(0, 1000).is_err());
        assert!(HistoryLimit::new(-5, 1000).is_err());
        assert_eq!(HistoryLimit::new(25, 1000).unwrap().get(), 25);
        assert_eq!(HistoryLimit::new(i64::MAX, 1000).unwrap().get(), 1000);
        assert_eq!(HistoryLimit::default().get(), 10);
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let store = test_store();
        let a = store
            .append(&NewHistoryRecord::new("q", "m", "a", 1.0))
            .unwrap();
        let b = store
            .append(&NewHistoryRecord::new("q", "m", "b", 1.0))
            .unwrap();
        assert!(b > a);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_append_rejects_bad_durations() {
        let store = test_store();
        assert!(store
            .append(&NewHistoryRecord::new("q", "m", "a", -0.5))
            .is_err());
        assert!(store
            .append(&NewHistoryRecord::new("q", "m", "a", f64::NAN))
            .is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let store = test_store();
        // A row stamped in the future forces later appends to reuse its time.
        store
            .conn()
            .execute(
                "INSERT INTO requests_history (timestamp, question, model_name, answer, duration)
                 VALUES ('2999-01-01 00:00:00.000000', 'q', 'm', 'a', 1.0)",
                [],
            )
            .unwrap();
        store
            .append(&NewHistoryRecord::new("q2", "m", "b", 1.0))
            .unwrap();

        let rows = store.recent(HistoryLimit::default()).unwrap();
        assert_eq!(rows[0].question, "q2");
        assert_eq!(rows[0].timestamp, "2999-01-01 00:00:00.000000");
    }

    #[test]
    fn test_statistics_empty() {
        let store = test_store();
        let summary = store.statistics().unwrap();
        assert!(summary.statistics.is_empty());
        assert_eq!(summary.total_requests, 0);
    }
}
