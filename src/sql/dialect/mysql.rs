//! MySQL SQL dialect.

use super::helpers;
use super::{SqlDialect, TimeGrain};
use crate::sql::expr::{func, lit_str, Expr};

#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    // Positional only; binding order is statement text order.
    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }

    fn supports_concat_operator(&self) -> bool {
        false
    }

    fn integer_type(&self) -> &'static str {
        "SIGNED"
    }

    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr {
        func(
            "DATE_FORMAT",
            vec![expr, lit_str(helpers::time_format_strftime(grain))],
        )
    }
}
