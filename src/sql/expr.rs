//! Expression AST - the core of SQL expression building.
//!
//! This module provides a strongly-typed AST for SQL expressions
//! with exhaustive pattern matching enforced by the compiler.

use super::dialect::{Dialect, SqlDialect, TimeGrain};
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens_for_dialect()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values. Only trusted, static values belong here;
    /// caller-supplied values go through `Param`.
    Literal(Literal),

    /// Bind placeholder (1-based).
    Param(usize),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// NOT expr
    Not(Box<Expr>),

    /// Function call: name(args...)
    Function {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// BETWEEN: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// Wildcard: * or table.*
    Star { table: Option<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Timestamp truncated to a grain and formatted as text.
    ///
    /// Stays dialect-agnostic in the AST; the dialect picks the function
    /// and format string at render time.
    TimeBucket { grain: TimeGrain, expr: Box<Expr> },

    /// Integer component of a timestamp (year number, hour of day).
    TimePart { grain: TimeGrain, expr: Box<Expr> },

    /// CAST(expr AS type_name)
    Cast { expr: Box<Expr>, type_name: String },
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
    Bool(bool),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // String
    Concat,
    Like,
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream (default dialect).
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    /// Convert this expression to a token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::Param(index) => {
                ts.push(Token::Placeholder(*index));
            }

            Expr::BinaryOp { left, op, right } => {
                // MySQL reads || as OR
                if *op == BinaryOperator::Concat && !dialect.supports_concat_operator() {
                    ts.push(Token::FunctionName("CONCAT".into()));
                    ts.lparen();
                    ts.append(&left.to_tokens_for_dialect(dialect));
                    ts.comma().space();
                    ts.append(&right.to_tokens_for_dialect(dialect));
                    ts.rparen();
                } else {
                    ts.append(&left.to_tokens_for_dialect(dialect));
                    ts.space();
                    ts.push(binary_op_to_token(*op));
                    ts.space();
                    ts.append(&right.to_tokens_for_dialect(dialect));
                }
            }

            Expr::Not(expr) => {
                ts.push(Token::Not).space();
                ts.append(&expr.to_tokens_for_dialect(dialect));
            }

            Expr::Function {
                name,
                args,
                distinct,
            } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                if *distinct {
                    ts.push(Token::Distinct).space();
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // "x IN ()" is invalid SQL: it is FALSE, "x NOT IN ()" is TRUE
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    ts.append(&expr.to_tokens_for_dialect(dialect));
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&val.to_tokens_for_dialect(dialect));
                    }
                    ts.rparen();
                }
            }

            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                ts.append(&expr.to_tokens_for_dialect(dialect));
                if *negated {
                    ts.space().push(Token::Not);
                }
                ts.space().push(Token::Between).space();
                ts.append(&low.to_tokens_for_dialect(dialect));
                ts.space().push(Token::And).space();
                ts.append(&high.to_tokens_for_dialect(dialect));
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens_for_dialect(dialect));
                ts.rparen();
            }

            Expr::TimeBucket { grain, expr } => {
                let rendered = dialect.time_bucket(*grain, expr.as_ref().clone());
                ts.append(&rendered.to_tokens_for_dialect(dialect));
            }

            Expr::TimePart { grain, expr } => {
                let rendered = dialect.time_part(*grain, expr.as_ref().clone());
                ts.append(&rendered.to_tokens_for_dialect(dialect));
            }

            Expr::Cast { expr, type_name } => {
                ts.push(Token::Cast).lparen();
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.space().push(Token::As).space();
                ts.push(Token::TypeName(type_name.clone()));
                ts.rparen();
            }
        }

        ts
    }

    /// Render this expression as SQL text for a dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens_for_dialect(dialect).serialize(dialect)
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Concat => Token::Concat,
        BinaryOperator::Like => Token::Like,
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Create an integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// Create a string literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// Create a boolean literal.
pub fn lit_bool(b: bool) -> Expr {
    Expr::Literal(Literal::Bool(b))
}

/// Create a NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Create a bind placeholder.
pub fn param(index: usize) -> Expr {
    Expr::Param(index)
}

/// Create a star (*) expression.
pub fn star() -> Expr {
    Expr::Star { table: None }
}

/// Bucket a timestamp expression to a grain.
pub fn time_bucket(grain: TimeGrain, expr: Expr) -> Expr {
    Expr::TimeBucket {
        grain,
        expr: Box::new(expr),
    }
}

/// Integer component of a timestamp. Only meaningful for grains with
/// [`TimeGrain::has_numeric_part`].
pub fn time_part(grain: TimeGrain, expr: Expr) -> Expr {
    Expr::TimePart {
        grain,
        expr: Box::new(expr),
    }
}

pub fn cast(expr: Expr, type_name: &str) -> Expr {
    Expr::Cast {
        expr: Box::new(expr),
        type_name: type_name.into(),
    }
}

// =============================================================================
// Aggregate Functions
// =============================================================================

/// Aggregate call with an optional DISTINCT.
pub fn aggregate(name: &str, expr: Expr, distinct: bool) -> Expr {
    Expr::Function {
        name: name.into(),
        args: vec![expr],
        distinct,
    }
}

/// COUNT(expr)
pub fn count(expr: Expr) -> Expr {
    aggregate("COUNT", expr, false)
}

/// COUNT(*)
pub fn count_star() -> Expr {
    aggregate("COUNT", star(), false)
}

/// COUNT(DISTINCT expr)
pub fn count_distinct(expr: Expr) -> Expr {
    aggregate("COUNT", expr, true)
}

/// SUM(expr)
pub fn sum(expr: Expr) -> Expr {
    aggregate("SUM", expr, false)
}

/// AVG(expr)
pub fn avg(expr: Expr) -> Expr {
    aggregate("AVG", expr, false)
}

/// MIN(expr)
pub fn min(expr: Expr) -> Expr {
    aggregate("MIN", expr, false)
}

/// MAX(expr)
pub fn max(expr: Expr) -> Expr {
    aggregate("MAX", expr, false)
}

/// Generic function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
        distinct: false,
    }
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn binary(self, op: BinaryOperator, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op,
            right: Box::new(other.into()),
        }
    }

    // Comparison operators
    fn eq(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Ne, other)
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gt, other)
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Gte, other)
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lt, other)
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Lte, other)
    }

    // Logical operators
    fn and(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Or, other)
    }

    fn not(self) -> Expr {
        Expr::Not(Box::new(self.into_expr()))
    }

    // String operators
    fn like(self, pattern: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Like, pattern)
    }

    fn concat(self, other: impl Into<Expr>) -> Expr {
        self.binary(BinaryOperator::Concat, other)
    }

    // NULL checks
    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }

    // IN operator
    fn in_list(self, values: Vec<Expr>) -> Expr {
        Expr::In {
            expr: Box::new(self.into_expr()),
            values,
            negated: false,
        }
    }

    // BETWEEN operator
    fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Expr {
        Expr::Between {
            expr: Box::new(self.into_expr()),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
            negated: false,
        }
    }

    /// Alias this expression (for SELECT list).
    fn alias(self, name: &str) -> super::query::SelectExpr {
        super::query::SelectExpr {
            expr: self.into_expr(),
            alias: Some(name.into()),
        }
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        lit_int(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        lit_int(n as i64)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Literal(Literal::String(s))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_column() {
        let sql = table_col("s", "region").to_sql(Dialect::Postgres);
        assert_eq!(sql, "\"s\".\"region\"");
    }

    #[test]
    fn test_binary_op_with_param() {
        let sql = table_col("s", "region").eq(param(1)).to_sql(Dialect::Postgres);
        assert_eq!(sql, "\"s\".\"region\" = $1");
    }

    #[test]
    fn test_count_distinct() {
        let sql = count_distinct(table_col("t", "id")).to_sql(Dialect::Postgres);
        assert_eq!(sql, "COUNT(DISTINCT \"t\".\"id\")");
    }

    #[test]
    fn test_between_params() {
        let sql = col("total_amount")
            .between(param(1), param(2))
            .to_sql(Dialect::Postgres);
        assert_eq!(sql, "\"total_amount\" BETWEEN $1 AND $2");
    }

    #[test]
    fn test_in_list_params() {
        let sql = col("region")
            .in_list(vec![param(1), param(2)])
            .to_sql(Dialect::Sqlite);
        assert_eq!(sql, "\"region\" IN (?1, ?2)");
    }

    #[test]
    fn test_in_list_empty() {
        let expr = col("region").in_list(vec![]);
        assert_eq!(expr.to_sql(Dialect::Postgres), "FALSE");
    }

    #[test]
    fn test_contains_pattern_concat() {
        let expr = col("name").like(lit_str("%").concat(param(1)).concat(lit_str("%")));
        assert_eq!(
            expr.to_sql(Dialect::Postgres),
            "\"name\" LIKE '%' || $1 || '%'"
        );
        assert_eq!(
            expr.to_sql(Dialect::MySql),
            "`name` LIKE CONCAT(CONCAT('%', ?), '%')"
        );
        assert_eq!(expr.to_sql(Dialect::TSql), "[name] LIKE '%' + @p1 + '%'");
    }

    #[test]
    fn test_time_bucket_renders_per_dialect() {
        let expr = time_bucket(TimeGrain::Month, table_col("t", "created_at"));
        assert_eq!(
            expr.to_sql(Dialect::Postgres),
            "TO_CHAR(\"t\".\"created_at\", 'YYYY-MM')"
        );
        assert_eq!(
            expr.to_sql(Dialect::Sqlite),
            "STRFTIME('%Y-%m', \"t\".\"created_at\")"
        );
        assert_eq!(
            expr.to_sql(Dialect::DuckDb),
            "STRFTIME(\"t\".\"created_at\", '%Y-%m')"
        );
        assert_eq!(
            expr.to_sql(Dialect::MySql),
            "DATE_FORMAT(`t`.`created_at`, '%Y-%m')"
        );
        assert_eq!(
            expr.to_sql(Dialect::TSql),
            "FORMAT([t].[created_at], 'yyyy-MM')"
        );
    }

    #[test]
    fn test_time_part_casts_bucket_to_integer() {
        let expr = time_part(TimeGrain::Hour, table_col("t", "created_at"));
        assert_eq!(
            expr.to_sql(Dialect::Postgres),
            "CAST(TO_CHAR(\"t\".\"created_at\", 'HH24') AS INTEGER)"
        );
        assert_eq!(
            expr.to_sql(Dialect::Sqlite),
            "CAST(STRFTIME('%H', \"t\".\"created_at\") AS INTEGER)"
        );
        assert_eq!(
            expr.to_sql(Dialect::MySql),
            "CAST(DATE_FORMAT(`t`.`created_at`, '%H') AS SIGNED)"
        );
        assert_eq!(
            expr.to_sql(Dialect::TSql),
            "CAST(FORMAT([t].[created_at], 'HH') AS INT)"
        );
    }

    #[test]
    fn test_is_null_and_not() {
        let sql = col("client_id").is_null().not().to_sql(Dialect::Postgres);
        assert_eq!(sql, "NOT \"client_id\" IS NULL");
    }
}
