//! Engine backed by the external worker process.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::engine::{Row, SqlEngine};
use super::error::{ExecutionError, ExecutionResult};
use crate::compiler::Statement;
use crate::config::{Driver, PoolSettings};
use crate::sql::Dialect;
use crate::worker::protocol::ConnectionParams;
use crate::worker::{WorkerClient, WorkerResult};

/// Sends statements to the worker, which owns the connection pool.
pub struct WorkerEngine {
    client: Arc<WorkerClient>,
    driver: Driver,
    connection: ConnectionParams,
}

impl WorkerEngine {
    pub fn new(client: Arc<WorkerClient>, driver: Driver, connection_string: impl Into<String>) -> Self {
        Self {
            client,
            driver,
            connection: ConnectionParams {
                driver: driver.as_str().to_string(),
                connection_string: connection_string.into(),
            },
        }
    }

    /// Spawn a worker configured with the pool flags.
    pub async fn spawn<P: AsRef<Path>>(
        worker_path: P,
        driver: Driver,
        connection_string: impl Into<String>,
        pool: &PoolSettings,
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let client =
            WorkerClient::spawn_with_args_and_timeout(worker_path, &pool.to_worker_args(), timeout)
                .await?;
        Ok(Self::new(Arc::new(client), driver, connection_string))
    }
}

#[async_trait]
impl SqlEngine for WorkerEngine {
    fn name(&self) -> &str {
        &self.connection.driver
    }

    fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    async fn execute(&self, statement: &Statement) -> ExecutionResult<Vec<Row>> {
        let args = statement.params.iter().map(|p| p.to_json()).collect();
        let response = self
            .client
            .execute_query(
                &self.connection.driver,
                &self.connection.connection_string,
                &statement.sql,
                args,
            )
            .await?;
        Ok(response.into_objects())
    }

    async fn health_check(&self) -> ExecutionResult<()> {
        if !self.client.is_alive() {
            return Err(ExecutionError::ConnectionFailure(
                "worker process is not running".into(),
            ));
        }
        let pong = self
            .client
            .ping(&self.connection.driver, &self.connection.connection_string)
            .await?;
        if pong.ok {
            Ok(())
        } else {
            Err(ExecutionError::ConnectionFailure(
                "worker reported an unhealthy pool".into(),
            ))
        }
    }
}
