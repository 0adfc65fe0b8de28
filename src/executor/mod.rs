//! Query execution.
//!
//! [`QueryExecutor`] runs a [`CompiledQuery`] on a [`SqlEngine`] and always
//! hands back a [`QueryResult`]: engine failures, timeouts and cancellation
//! are reported in `QueryResult::error`, never as an `Err` or a panic.

mod engine;
mod error;
mod result;
mod sqlite;
mod worker;

pub use engine::{Row, SqlEngine};
pub use error::{ExecutionError, ExecutionErrorKind, ExecutionResult};
pub use result::QueryResult;
pub use sqlite::SqliteEngine;
pub use worker::WorkerEngine;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::ResultMemo;
use crate::compiler::{CompiledQuery, Statement};
use crate::config::EngineSettings;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Per-call execution options.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Overrides the executor's default timeout. Covers waiting for a permit.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl ExecuteOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Runs compiled queries with bounded concurrency.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: Arc<dyn SqlEngine>,
    permits: Arc<Semaphore>,
    memo: Option<ResultMemo>,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(engine: Arc<dyn SqlEngine>) -> Self {
        Self {
            engine,
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_IN_FLIGHT)),
            memo: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Apply `timeout_ms` and `max_in_flight` from settings.
    pub fn from_settings(engine: Arc<dyn SqlEngine>, settings: &EngineSettings) -> Self {
        Self::new(engine)
            .with_timeout(settings.timeout())
            .with_max_in_flight(settings.max_in_flight)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
        self
    }

    pub fn with_memo(mut self, memo: Option<ResultMemo>) -> Self {
        self.memo = memo;
        self
    }

    pub fn engine(&self) -> &Arc<dyn SqlEngine> {
        &self.engine
    }

    pub async fn execute(&self, query: &CompiledQuery) -> QueryResult {
        self.execute_with(query, &ExecuteOptions::default()).await
    }

    pub async fn execute_with(&self, query: &CompiledQuery, options: &ExecuteOptions) -> QueryResult {
        let started = Instant::now();
        let statement = query.statement();

        if query.dialect() != self.engine.dialect() {
            let error = ExecutionError::Engine(format!(
                "query compiled for {} but engine '{}' speaks {}",
                query.dialect(),
                self.engine.name(),
                self.engine.dialect()
            ));
            warn!(error = %error, "dialect mismatch");
            return QueryResult::failure(error, statement.sql, started.elapsed());
        }

        let key = self.memo.as_ref().and_then(|_| ResultMemo::key(&statement));
        if let (Some(memo), Some(key)) = (&self.memo, &key) {
            if let Some(rows) = memo.get(key).await {
                return QueryResult::success((*rows).clone(), statement.sql, started.elapsed());
            }
        }

        let timeout = options.timeout.unwrap_or(self.timeout);
        debug!(
            engine = self.engine.name(),
            params = statement.params.len(),
            timeout_ms = timeout.as_millis() as u64,
            "executing query"
        );

        let outcome = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => Err(ExecutionError::Cancelled),
            run = tokio::time::timeout(timeout, self.run(&statement)) => {
                run.unwrap_or_else(|_| Err(ExecutionError::Timeout(timeout.as_millis())))
            }
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok(rows) => {
                debug!(rows = rows.len(), elapsed_ms = elapsed.as_millis() as u64, "query finished");
                if let (Some(memo), Some(key)) = (&self.memo, key) {
                    memo.insert(key, Arc::new(rows.clone())).await;
                }
                QueryResult::success(rows, statement.sql, elapsed)
            }
            Err(error) => {
                warn!(engine = self.engine.name(), error = %error, "query failed");
                QueryResult::failure(error, statement.sql, elapsed)
            }
        }
    }

    async fn run(&self, statement: &Statement) -> ExecutionResult<Vec<Row>> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ExecutionError::Engine("executor is shut down".into()))?;
        self.engine.execute(statement).await
    }

    pub async fn health_check(&self) -> ExecutionResult<()> {
        self.engine.health_check().await
    }
}
