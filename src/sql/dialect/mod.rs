//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (PG/DuckDB/SQLite), `` ` `` (MySQL), `[]` (T-SQL)
//! - Bind placeholders: `$1` (PG/DuckDB), `?1` (SQLite), `?` (MySQL), `@p1` (T-SQL)
//! - Pagination: LIMIT/OFFSET vs OFFSET FETCH
//! - Boolean literals: true/false vs 1/0
//! - String concatenation: `||` vs `+` vs CONCAT()
//! - Time bucketing: TO_CHAR / STRFTIME / DATE_FORMAT / FORMAT
//!
//! # Usage
//!
//! ```ignore
//! use starql::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("region");  // "region"
//! let slot = dialect.placeholder(1);                // $1
//! ```

mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;
mod tsql;

pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

use serde::{Deserialize, Serialize};

use super::expr::{cast, Expr};
use super::token::TokenStream;

/// Granularity a timestamp is bucketed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    Year,
    Month,
    Day,
    /// Hour of day (00-23), not a calendar bucket.
    Hour,
}

impl TimeGrain {
    /// Whether the bucket text is a plain integer (`2024`, `09`).
    pub fn has_numeric_part(&self) -> bool {
        matches!(self, TimeGrain::Year | TimeGrain::Hour)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGrain::Year => "year",
            TimeGrain::Month => "month",
            TimeGrain::Day => "day",
            TimeGrain::Hour => "hour",
        }
    }
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    /// Override for Unicode prefix (T-SQL N'...').
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    // =========================================================================
    // Parameter Binding
    // =========================================================================

    /// Render the bind placeholder for the 1-based parameter `index`.
    ///
    /// Default is the numbered `$n` form used by Postgres and DuckDB.
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether this dialect requires ORDER BY for OFFSET/LIMIT.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Whether this dialect supports the concat operator at all.
    ///
    /// MySQL uses `||` as logical OR by default.
    fn supports_concat_operator(&self) -> bool {
        true
    }

    // =========================================================================
    // Date/Time
    // =========================================================================

    /// Render `expr` bucketed to `grain` as a text expression.
    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr;

    /// Name of the signed integer type in CAST.
    fn integer_type(&self) -> &'static str {
        "INTEGER"
    }

    /// Render the bucket of `expr` as an integer, for numeric comparisons.
    fn time_part(&self, grain: TimeGrain, expr: Expr) -> Expr {
        cast(self.time_bucket(grain, expr), self.integer_type())
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
    Sqlite,
    MySql,
    #[serde(alias = "mssql")]
    TSql,
}

impl Dialect {
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
            Dialect::Sqlite => &Sqlite,
            Dialect::MySql => &MySql,
            Dialect::TSql => &TSql,
        }
    }

    /// Parse a dialect name as written in config files.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "duckdb" | "duck" => Some(Dialect::DuckDb),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            "mysql" => Some(Dialect::MySql),
            "tsql" | "mssql" | "sqlserver" => Some(Dialect::TSql),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn placeholder(&self, index: usize) -> String {
        self.dialect().placeholder(index)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_concat_operator(&self) -> bool {
        self.dialect().supports_concat_operator()
    }

    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr {
        self.dialect().time_bucket(grain, expr)
    }

    fn integer_type(&self) -> &'static str {
        self.dialect().integer_type()
    }

    fn time_part(&self, grain: TimeGrain, expr: Expr) -> Expr {
        self.dialect().time_part(grain, expr)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
