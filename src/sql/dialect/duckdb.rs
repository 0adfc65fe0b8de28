//! DuckDB SQL dialect.

use super::helpers;
use super::{SqlDialect, TimeGrain};
use crate::sql::expr::{func, lit_str, Expr};

#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    // DuckDB takes the timestamp first: strftime(ts, format)
    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr {
        func(
            "STRFTIME",
            vec![expr, lit_str(helpers::time_format_strftime(grain))],
        )
    }
}
