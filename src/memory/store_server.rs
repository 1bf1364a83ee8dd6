// src/memory/store_server.rs — Async message passing for Store
//
// One task owns the SQLite connection; everything else talks to it through
// a cloneable `StoreHandle`. Commands are applied one at a time, so each
// append is atomic with respect to concurrent readers.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::store::{HistoryLimit, HistoryRecord, NewHistoryRecord, StatisticsSummary, Store};
use super::HistoryStore;
use crate::infra::errors::AggregatorError;

#[derive(Debug)]
pub enum StoreCommand {
    Append {
        record: NewHistoryRecord,
        resp: oneshot::Sender<anyhow::Result<i64>>,
    },
    Statistics {
        resp: oneshot::Sender<anyhow::Result<StatisticsSummary>>,
    },
    Recent {
        limit: HistoryLimit,
        resp: oneshot::Sender<anyhow::Result<Vec<HistoryRecord>>>,
    },
    Clear {
        resp: oneshot::Sender<anyhow::Result<()>>,
    },
    Count {
        resp: oneshot::Sender<anyhow::Result<u64>>,
    },
}

/// A handle to the Store that uses message passing.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    pub fn new(tx: mpsc::Sender<StoreCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<anyhow::Result<T>>) -> StoreCommand,
    ) -> Result<T, AggregatorError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(build(resp_tx))
            .await
            .map_err(|_| AggregatorError::persistence("store task is not running"))?;
        resp_rx
            .await
            .map_err(|_| AggregatorError::persistence("store task dropped the request"))?
            .map_err(AggregatorError::persistence)
    }
}

#[async_trait]
impl HistoryStore for StoreHandle {
    async fn append(&self, record: NewHistoryRecord) -> Result<i64, AggregatorError> {
        self.request(|resp| StoreCommand::Append { record, resp })
            .await
    }

    async fn statistics(&self) -> Result<StatisticsSummary, AggregatorError> {
        self.request(|resp| StoreCommand::Statistics { resp }).await
    }

    async fn recent(&self, limit: HistoryLimit) -> Result<Vec<HistoryRecord>, AggregatorError> {
        self.request(|resp| StoreCommand::Recent { limit, resp })
            .await
    }

    async fn clear(&self) -> Result<(), AggregatorError> {
        self.request(|resp| StoreCommand::Clear { resp }).await
    }

    async fn count(&self) -> Result<u64, AggregatorError> {
        self.request(|resp| StoreCommand::Count { resp }).await
    }
}

/// Helper to spawn the store server and return a handle.
pub fn spawn_store_server(store: Store) -> (StoreHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(100);
    let handle = StoreHandle::new(tx);
    let join_handle = tokio::spawn(run_store_server(store, rx));
    (handle, join_handle)
}

/// The background task that owns the Store.
pub async fn run_store_server(store: Store, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::Append { record, resp } => {
                let res = store.append(&record);
                if let Err(ref e) = res {
                    tracing::warn!(model = %record.model_name, "history append failed: {e}");
                }
                let _ = resp.send(res);
            }
            StoreCommand::Statistics { resp } => {
                let _ = resp.send(store.statistics());
            }
            StoreCommand::Recent { limit, resp } => {
                let _ = resp.send(store.recent(limit));
            }
            StoreCommand::Clear { resp } => {
                let _ = resp.send(store.clear());
            }
            StoreCommand::Count { resp } => {
                let _ = resp.send(store.count());
            }
        }
    }
    tracing::debug!("store server shutting down");
}
