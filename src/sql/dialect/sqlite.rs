//! SQLite SQL dialect.
//!
//! SQLite features:
//! - ANSI identifier quoting (`"`)
//! - No boolean type (1/0)
//! - Numbered `?NNN` bind placeholders
//! - strftime(format, ts) with the format first
//! - Timestamps stored as ISO-8601 text

use super::helpers;
use super::{SqlDialect, TimeGrain};
use crate::sql::expr::{func, lit_str, Expr};

#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }

    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr {
        func(
            "STRFTIME",
            vec![lit_str(helpers::time_format_strftime(grain)), expr],
        )
    }
}
