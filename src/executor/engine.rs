//! The pluggable SQL engine seam.

use async_trait::async_trait;

use super::error::ExecutionResult;
use crate::compiler::Statement;
use crate::sql::Dialect;

/// One result row: column alias to JSON value, in select-list order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Something that can run a compiled statement.
///
/// Implementations receive SQL rendered for [`dialect`](SqlEngine::dialect)
/// with `params[i]` bound to placeholder `i + 1`. Dropping the returned
/// future must abandon the work.
#[async_trait]
pub trait SqlEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Dialect the engine's database speaks.
    fn dialect(&self) -> Dialect;

    async fn execute(&self, statement: &Statement) -> ExecutionResult<Vec<Row>>;

    /// Check the engine can reach its database.
    async fn health_check(&self) -> ExecutionResult<()>;
}
