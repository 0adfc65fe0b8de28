//! Embedded SQLite engine.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, InterruptHandle, ToSql};
use tracing::debug;

use super::engine::{Row, SqlEngine};
use super::error::{ExecutionError, ExecutionResult};
use crate::compiler::Statement;
use crate::model::ParamValue;
use crate::sql::Dialect;

impl ToSql for ParamValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            ParamValue::Bool(b) => b.to_sql(),
            ParamValue::Int(i) => i.to_sql(),
            ParamValue::Float(f) => f.to_sql(),
            ParamValue::Text(s) => s.to_sql(),
        }
    }
}

/// Runs statements against one SQLite connection on the blocking pool.
///
/// Statements are serialized on the connection. Dropping an in-flight
/// `execute` future interrupts the running statement.
pub struct SqliteEngine {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
    name: String,
}

impl SqliteEngine {
    pub fn open<P: AsRef<Path>>(path: P) -> ExecutionResult<Self> {
        let name = format!("sqlite:{}", path.as_ref().display());
        Ok(Self::from_connection(Connection::open(path)?, name))
    }

    pub fn open_in_memory() -> ExecutionResult<Self> {
        Ok(Self::from_connection(
            Connection::open_in_memory()?,
            "sqlite::memory:".to_string(),
        ))
    }

    /// Open `:memory:` or a file path as written in `engine.connection`.
    pub fn from_connection_string(connection: &str) -> ExecutionResult<Self> {
        match connection {
            "" | ":memory:" => Self::open_in_memory(),
            path => Self::open(path),
        }
    }

    fn from_connection(conn: Connection, name: String) -> Self {
        let interrupt = Arc::new(conn.get_interrupt_handle());
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
            name,
        }
    }

    /// Run a batch of statements without results, e.g. schema setup.
    pub async fn execute_batch(&self, sql: &str) -> ExecutionResult<()> {
        let sql = sql.to_string();
        self.with_connection(move |conn| conn.execute_batch(&sql).map_err(ExecutionError::from))
            .await
    }

    async fn with_connection<T, F>(&self, f: F) -> ExecutionResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ExecutionResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let mut guard = InterruptOnDrop(Some(Arc::clone(&self.interrupt)));

        let outcome = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| ExecutionError::Engine("sqlite connection lock poisoned".into()))?;
            f(&conn)
        })
        .await;

        guard.disarm();
        outcome.map_err(|e| ExecutionError::Engine(format!("sqlite task failed: {e}")))?
    }
}

/// Interrupts the connection unless disarmed, so a dropped future stops its statement.
struct InterruptOnDrop(Option<Arc<InterruptHandle>>);

impl InterruptOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            debug!("interrupting sqlite statement");
            handle.interrupt();
        }
    }
}

fn query_rows(conn: &Connection, sql: &str, params: &[ParamValue]) -> ExecutionResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut object = Row::new();
        for (i, name) in names.iter().enumerate() {
            object.insert(name.clone(), to_json(row.get_ref(i)?));
        }
        out.push(object);
    }
    Ok(out)
}

fn to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => i.into(),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned().into()
        }
    }
}

#[async_trait]
impl SqlEngine for SqliteEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, statement: &Statement) -> ExecutionResult<Vec<Row>> {
        let sql = statement.sql.clone();
        let params = statement.params.clone();
        self.with_connection(move |conn| query_rows(conn, &sql, &params))
            .await
    }

    async fn health_check(&self) -> ExecutionResult<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(sql: &str, params: Vec<ParamValue>) -> Statement {
        Statement {
            sql: sql.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_binds_numbered_placeholders() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .execute_batch(
                "CREATE TABLE stores (id INTEGER, region TEXT);
                 INSERT INTO stores VALUES (1, 'NCR'), (2, 'CAR'), (3, 'NCR');",
            )
            .await
            .unwrap();

        let rows = engine
            .execute(&statement(
                "SELECT region, COUNT(id) AS n FROM stores WHERE region = ?1 GROUP BY region",
                vec!["NCR".into()],
            ))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["region"], "NCR");
        assert_eq!(rows[0]["n"], 2);
    }

    #[tokio::test]
    async fn test_column_types_convert() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let rows = engine
            .execute(&statement(
                "SELECT 1 AS i, 2.5 AS f, 'x' AS s, NULL AS n, ?1 AS b",
                vec![ParamValue::Bool(true)],
            ))
            .await
            .unwrap();
        assert_eq!(rows[0]["i"], 1);
        assert_eq!(rows[0]["f"], 2.5);
        assert_eq!(rows[0]["s"], "x");
        assert!(rows[0]["n"].is_null());
        assert_eq!(rows[0]["b"], 1);
    }

    #[tokio::test]
    async fn test_syntax_error_kind() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let err = engine
            .execute(&statement("SELEC 1", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::EngineSyntaxError(_)));
    }

    #[tokio::test]
    async fn test_missing_table_is_engine_error() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let err = engine
            .execute(&statement("SELECT * FROM nowhere", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Engine(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let engine = SqliteEngine::from_connection_string(":memory:").unwrap();
        engine.health_check().await.unwrap();
        assert_eq!(engine.dialect(), Dialect::Sqlite);
    }
}
