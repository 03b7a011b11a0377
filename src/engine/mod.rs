//! Worker-isolated access to the embedded relational engine.
//!
//! The engine's API is blocking, so the one live connection runs on a
//! dedicated OS thread. Callers talk to it through a bounded request
//! channel; responses come back on a second channel and are matched to
//! their waiting callers strictly by correlation ID through a pending map
//! of one-shot completion handles. Responses may therefore arrive in any
//! order; nothing here guarantees FIFO between two in-flight statements.

mod config;
mod protocol;
mod worker;

pub use config::{DEFAULT_STORE, EngineConfig, StorageLocation};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;
use uuid::Uuid;

use crate::core::{DbError, Result, Value};
use crate::result::QueryResult;
use protocol::{Request, ResponseBody};

type PendingMap = Arc<Mutex<HashMap<Uuid, oneshot::Sender<ResponseBody>>>>;

/// Cloneable handle to the engine worker. All clones share one worker
/// thread and one request channel; the channel is the serialization point,
/// so no further locking exists around the engine itself.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    requests: mpsc::Sender<Request>,
    pending: PendingMap,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl EngineHandle {
    /// Spawn the worker thread and wait for it to open the store. The
    /// handshake makes open failures (bad path, corrupt store) surface here
    /// rather than on the first query.
    pub async fn spawn(config: EngineConfig) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel(config.queue_capacity);
        let (response_tx, mut response_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = std::thread::Builder::new()
            .name("healthtrack-engine".into())
            .spawn(move || worker::run(config, request_rx, response_tx, ready_tx))
            .map_err(|err| {
                DbError::Initialization(format!("failed to spawn engine worker: {}", err))
            })?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(message)) => return Err(DbError::Initialization(message)),
            Err(_) => {
                return Err(DbError::Initialization(
                    "engine worker exited before reporting readiness".into(),
                ));
            }
        }

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let dispatcher_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            while let Some(response) = response_rx.recv().await {
                let waiter = dispatcher_pending
                    .lock()
                    .ok()
                    .and_then(|mut map| map.remove(&response.id));
                match waiter {
                    Some(reply) => {
                        // A caller that gave up (dropped future) is fine to miss.
                        let _ = reply.send(response.body);
                    }
                    None => warn!(id = %response.id, "response without a waiting caller"),
                }
            }
        });

        Ok(Self {
            requests: request_tx,
            pending,
            worker: Arc::new(Mutex::new(Some(thread))),
        })
    }

    /// Run one SQL statement with positional parameters. Suspends the caller
    /// until the matching response arrives; there is no timeout.
    pub async fn query(&self, sql: impl Into<String>, params: Vec<Value>) -> Result<QueryResult> {
        let id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock()?.insert(id, reply_tx);

        let request = Request {
            id,
            sql: sql.into(),
            params,
        };
        if self.requests.send(request).await.is_err() {
            if let Ok(mut map) = self.pending.lock() {
                map.remove(&id);
            }
            return Err(DbError::Disconnected);
        }

        match reply_rx.await {
            Ok(ResponseBody::Rows(result)) => Ok(result),
            Ok(ResponseBody::Error(message)) => Err(DbError::Storage(message)),
            Err(_) => Err(DbError::Disconnected),
        }
    }

    /// Explicit teardown: close this handle's request channel and wait for
    /// the worker thread to finish. The worker only exits once every clone
    /// of the handle is gone, so callers owning clones must drop them first.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            requests,
            pending: _,
            worker,
        } = self;
        drop(requests);

        let thread = worker.lock()?.take();
        if let Some(thread) = thread {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .map_err(|err| DbError::Storage(format!("engine shutdown task failed: {}", err)))?
                .map_err(|_| DbError::Storage("engine worker panicked".into()))?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn same_worker(&self, other: &Self) -> bool {
        self.requests.same_channel(&other.requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_round_trip() {
        let engine = EngineHandle::spawn(EngineConfig::new().in_memory())
            .await
            .unwrap();

        engine
            .query("CREATE TABLE t (n INTEGER)", Vec::new())
            .await
            .unwrap();
        engine
            .query("INSERT INTO t VALUES (?1)", vec![Value::Integer(7)])
            .await
            .unwrap();

        let result = engine.query("SELECT n FROM t", Vec::new()).await.unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(7)]]);
    }

    #[tokio::test]
    async fn test_statement_failure_keeps_host_alive() {
        let engine = EngineHandle::spawn(EngineConfig::new().in_memory())
            .await
            .unwrap();

        let err = engine.query("SELECT * FORM t", Vec::new()).await.unwrap_err();
        assert!(matches!(err, DbError::Storage(_)));

        // The host answers the next request normally.
        let result = engine.query("SELECT 1 AS one", Vec::new()).await.unwrap();
        assert_eq!(result.value(0, "one"), Some(&Value::Integer(1)));
    }

    #[tokio::test]
    async fn test_open_failure_surfaces_at_spawn() {
        let err = EngineHandle::spawn(
            EngineConfig::new().at_path("/dev/null/not-a-directory/store.db"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::Initialization(_)));
    }

    #[tokio::test]
    async fn test_shutdown_joins_worker() {
        let engine = EngineHandle::spawn(EngineConfig::new().in_memory())
            .await
            .unwrap();
        engine.shutdown().await.unwrap();
    }
}
