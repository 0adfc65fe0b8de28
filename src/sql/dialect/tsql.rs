//! T-SQL (SQL Server) dialect.

use super::helpers;
use super::{SqlDialect, TimeGrain};
use crate::sql::expr::{func, lit_str, Expr};
use crate::sql::token::TokenStream;

#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{}", index)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn concat_operator(&self) -> &'static str {
        "+"
    }

    fn integer_type(&self) -> &'static str {
        "INT"
    }

    fn time_bucket(&self, grain: TimeGrain, expr: Expr) -> Expr {
        func(
            "FORMAT",
            vec![expr, lit_str(helpers::time_format_dotnet(grain))],
        )
    }
}
