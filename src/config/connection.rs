//! Database drivers reachable through the engines.

use crate::sql::Dialect;

use super::settings::SettingsError;

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// PostgreSQL (worker)
    Postgres,
    /// Microsoft SQL Server (worker)
    MsSql,
    /// DuckDB file or in-memory (worker)
    DuckDb,
    /// MySQL (worker)
    MySql,
    /// SQLite, embedded or through the worker
    Sqlite,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "mssql" | "sqlserver" | "sql_server" => Ok(Driver::MsSql),
            "duckdb" | "duck" => Ok(Driver::DuckDb),
            "mysql" => Ok(Driver::MySql),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(SettingsError::UnsupportedDriver(other.to_string())),
        }
    }

    /// Get the driver name for the worker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MsSql => "mssql",
            Driver::DuckDb => "duckdb",
            Driver::MySql => "mysql",
            Driver::Sqlite => "sqlite",
        }
    }

    /// SQL dialect the driver's database speaks.
    pub fn dialect(&self) -> Dialect {
        match self {
            Driver::Postgres => Dialect::Postgres,
            Driver::MsSql => Dialect::TSql,
            Driver::DuckDb => Dialect::DuckDb,
            Driver::MySql => Dialect::MySql,
            Driver::Sqlite => Dialect::Sqlite,
        }
    }
}
