//! Query compiler: `QueryConfig` + registry -> parameterized SQL.
//!
//! Compilation is a pipeline of pure stages threaded through an immutable
//! [`CompileState`]:
//!
//! ```text
//! resolve -> resolve_joins -> build_select -> build_aggregates
//!         -> build_where -> build_order_by -> assemble
//! ```
//!
//! Every failure is a [`ValidationError`] raised by `resolve`, before any
//! SQL exists. The same config, registry and options always produce
//! byte-identical SQL.
//!
//! # Example
//!
//! ```ignore
//! use starql::compiler::{compile_with, CompileOptions};
//! use starql::model::QueryConfig;
//! use starql::registry::DimensionRegistry;
//! use starql::sql::Dialect;
//!
//! let registry = DimensionRegistry::retail();
//! let config = QueryConfig::new().metric("revenue").dimension("region").limit(5);
//! let options = CompileOptions::default().with_dialect(Dialect::Sqlite);
//! let compiled = compile_with(&config, &registry, &options)?;
//! println!("{}", compiled.sql());
//! ```

mod error;
mod filters;
mod joins;
mod order;
mod output;
mod resolve;
mod select;

pub use error::{CompileResult, ValidationError, ValidationErrorKind};
pub use output::{
    AggregateSpec, CompiledQuery, JoinClause, OrderItem, OrderTarget, SelectItem, Statement,
};

use tracing::debug;

use crate::model::{ParamValue, QueryConfig};
use crate::registry::DimensionRegistry;
use crate::sql::{Dialect, Expr, OrderByExpr, Query, SelectExpr, TableRef};

use self::resolve::Resolved;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
    /// Reject unknown metrics, filters and order targets instead of dropping them.
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            strict: true,
        }
    }
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

// ============================================================================
// Pipeline state
// ============================================================================

/// Accumulator passed by value from stage to stage.
#[derive(Debug, Clone)]
pub(crate) struct CompileState<'r> {
    resolved: Resolved<'r>,
    joins: Vec<JoinClause>,
    select: Vec<SelectExpr>,
    group_by: Vec<Expr>,
    aggregates: Vec<AggregateSpec>,
    predicates: Vec<Expr>,
    params: Vec<ParamValue>,
    order_by: Vec<OrderByExpr>,
}

impl<'r> CompileState<'r> {
    fn new(resolved: Resolved<'r>) -> Self {
        Self {
            resolved,
            joins: Vec::new(),
            select: Vec::new(),
            group_by: Vec::new(),
            aggregates: Vec::new(),
            predicates: Vec::new(),
            params: Vec::new(),
            order_by: Vec::new(),
        }
    }
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile with default options (Postgres, strict).
pub fn compile(config: &QueryConfig, registry: &DimensionRegistry) -> CompileResult<CompiledQuery> {
    compile_with(config, registry, &CompileOptions::default())
}

pub fn compile_with(
    config: &QueryConfig,
    registry: &DimensionRegistry,
    options: &CompileOptions,
) -> CompileResult<CompiledQuery> {
    let resolved = resolve::resolve(config, registry, options.strict)?;

    let state = CompileState::new(resolved);
    let state = joins::resolve_joins(state, registry);
    let state = select::build_select(state, registry);
    let state = select::build_aggregates(state, registry);
    let state = filters::build_where(state, registry);
    let state = order::build_order_by(state);

    let compiled = assemble(state, registry, options.dialect);
    debug!(
        dialect = %compiled.dialect,
        joins = compiled.joins.len(),
        params = compiled.params.len(),
        "compiled query"
    );
    Ok(compiled)
}

fn assemble(state: CompileState<'_>, registry: &DimensionRegistry, dialect: Dialect) -> CompiledQuery {
    let schema = registry.schema();
    let fact = registry.fact();

    let select_items = state
        .select
        .iter()
        .map(|item| SelectItem {
            alias: item.alias.clone().unwrap_or_default(),
            expression: item.expr.to_sql(dialect),
        })
        .collect();

    let mut select_list = state.select.clone();
    select_list.extend(
        state
            .aggregates
            .iter()
            .map(|agg| SelectExpr::new(agg.expr()).with_alias(&agg.alias)),
    );

    let mut query = Query::new()
        .select(select_list)
        .from(
            TableRef::new(&fact.table)
                .with_schema(schema)
                .with_alias(&fact.alias),
        );
    for join in &state.joins {
        query = query.join(
            join.kind.into(),
            TableRef::new(&join.table)
                .with_schema(schema)
                .with_alias(&join.alias),
            join.on_expr(),
        );
    }
    for predicate in &state.predicates {
        query = query.filter(predicate.clone());
    }
    query = query
        .group_by(state.group_by.clone())
        .order_by(state.order_by.clone());
    if let Some(limit) = state.resolved.limit {
        query = query.limit(limit);
    }

    let tokens = query.to_tokens_for_dialect(dialect);
    debug_assert_eq!(tokens.placeholder_count(), state.params.len());

    CompiledQuery {
        sql: tokens.serialize(dialect),
        params: state.params,
        joins: state.joins,
        select: select_items,
        aggregates: state.aggregates,
        group_by: state.group_by.iter().map(|e| e.to_sql(dialect)).collect(),
        order_by: state.resolved.order_by,
        limit: state.resolved.limit,
        dialect,
    }
}
