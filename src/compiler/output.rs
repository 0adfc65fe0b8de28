//! Compiler output: the immutable compiled query and its structural metadata.

use serde::{Deserialize, Serialize};

use crate::model::{AggregateFunction, JoinKind, ParamValue, SortDirection};
use crate::sql::expr::{aggregate, table_col};
use crate::sql::{Dialect, Expr, ExprExt};

/// A join derived from the table map. Never hand-authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClause {
    pub table: String,
    pub alias: String,
    pub kind: JoinKind,
    pub parent_alias: String,
    pub parent_column: String,
    pub column: String,
}

impl JoinClause {
    /// `parent_alias.parent_column = alias.column`
    pub fn on_expr(&self) -> Expr {
        table_col(&self.parent_alias, &self.parent_column).eq(table_col(&self.alias, &self.column))
    }

    pub fn on_predicate(&self, dialect: Dialect) -> String {
        self.on_expr().to_sql(dialect)
    }
}

/// One aggregate in the SELECT list, aliased by its metric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSpec {
    pub function: AggregateFunction,
    pub table_alias: String,
    pub column: String,
    pub alias: String,
    pub distinct: bool,
}

impl AggregateSpec {
    /// `FUNC([DISTINCT] table_alias.column)`
    pub fn expr(&self) -> Expr {
        aggregate(
            self.function.sql_name(),
            table_col(&self.table_alias, &self.column),
            self.distinct,
        )
    }
}

/// A dimension column in the SELECT list, rendered for the query's dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectItem {
    pub alias: String,
    pub expression: String,
}

/// Whether an ORDER BY entry names a dimension or a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderTarget {
    Dimension,
    Metric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub alias: String,
    pub target: OrderTarget,
    pub direction: SortDirection,
}

/// The SQL text and ordered bind values, ready for an engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<ParamValue>,
}

/// A fully resolved, parameterized query.
///
/// Built once per `QueryConfig` by [`compile`](super::compile). Owns no
/// resources; `params[i]` binds placeholder `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    pub(crate) sql: String,
    pub(crate) params: Vec<ParamValue>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) select: Vec<SelectItem>,
    pub(crate) aggregates: Vec<AggregateSpec>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) limit: Option<u64>,
    pub(crate) dialect: Dialect,
}

impl CompiledQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[ParamValue] {
        &self.params
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn select(&self) -> &[SelectItem] {
        &self.select
    }

    pub fn aggregates(&self) -> &[AggregateSpec] {
        &self.aggregates
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by(&self) -> &[OrderItem] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn statement(&self) -> Statement {
        Statement {
            sql: self.sql.clone(),
            params: self.params.clone(),
        }
    }
}
