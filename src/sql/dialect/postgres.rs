//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - Numbered bind placeholders (`$1`)
//! - TO_CHAR for timestamp formatting

use super::helpers;
use super::{SqlDialect, TimeGrain};
use crate::sql::expr::{func, lit_str, Expr};

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    // Uses default placeholder ($n) and emit_limit_offset (LIMIT ... OFFSET ...)

    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr {
        func(
            "TO_CHAR",
            vec![expr, lit_str(helpers::time_format_postgres(grain))],
        )
    }
}
