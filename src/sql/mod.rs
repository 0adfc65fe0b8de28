//! SQL generation module.
//!
//! This module provides a type-safe SQL builder that generates multi-dialect SQL.
//! It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//!
//! Caller-supplied values never reach the SQL text: they are represented by
//! [`Expr::Param`] and rendered as the dialect's bind placeholder.

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect, TimeGrain};
pub use expr::{
    aggregate, avg, col, count, count_distinct, count_star, func, lit_bool, lit_int, lit_null,
    lit_str, max, min, param, star, sum, table_col, time_bucket, time_part, BinaryOperator, Expr,
    ExprExt, Literal,
};
pub use query::{Join, JoinType, LimitOffset, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Token, TokenStream};
