//! SELECT, GROUP BY and aggregate stages.

use super::output::AggregateSpec;
use super::CompileState;
use crate::model::Dimension;
use crate::registry::DimensionRegistry;
use crate::sql::expr::{table_col, time_bucket, time_part};
use crate::sql::{Expr, ExprExt};

fn table_alias<'r>(registry: &'r DimensionRegistry, table: &'r str) -> &'r str {
    registry.alias_of(table).unwrap_or(table)
}

/// The expression a dimension selects and groups by.
///
/// Time dimensions bucket their display field to the dimension's grain.
pub(crate) fn dimension_expr(dim: &Dimension, registry: &DimensionRegistry) -> Expr {
    let column = raw_column(dim, registry);
    match dim.grain {
        Some(grain) => time_bucket(grain, column),
        None => column,
    }
}

/// The expression filters on a dimension compare against.
///
/// Numeric values on a year or hour dimension compare against the integer
/// bucket rather than its text.
pub(crate) fn filter_expr(dim: &Dimension, registry: &DimensionRegistry, numeric: bool) -> Expr {
    if let Some(field) = &dim.filter_field {
        return table_col(table_alias(registry, &dim.table), field);
    }
    match dim.grain {
        Some(grain) if numeric && grain.has_numeric_part() => {
            time_part(grain, raw_column(dim, registry))
        }
        _ => dimension_expr(dim, registry),
    }
}

/// The unbucketed display column.
pub(crate) fn raw_column(dim: &Dimension, registry: &DimensionRegistry) -> Expr {
    table_col(table_alias(registry, &dim.table), &dim.display_field)
}

/// `expr AS "id"` per dimension, in request order; the same expressions
/// form the GROUP BY list.
pub(crate) fn build_select<'r>(
    state: CompileState<'r>,
    registry: &'r DimensionRegistry,
) -> CompileState<'r> {
    let group_by: Vec<Expr> = state
        .resolved
        .dimensions
        .iter()
        .map(|dim| dimension_expr(dim, registry))
        .collect();
    let select = state
        .resolved
        .dimensions
        .iter()
        .zip(&group_by)
        .map(|(dim, expr)| expr.clone().alias(&dim.id))
        .collect();

    CompileState {
        select,
        group_by,
        ..state
    }
}

/// One aggregate per metric, aliased by the metric id.
pub(crate) fn build_aggregates<'r>(
    state: CompileState<'r>,
    registry: &'r DimensionRegistry,
) -> CompileState<'r> {
    let aggregates = state
        .resolved
        .metrics
        .iter()
        .map(|metric| AggregateSpec {
            function: metric.function,
            table_alias: table_alias(registry, &metric.table).to_string(),
            column: metric.column.clone(),
            alias: metric.id.clone(),
            distinct: metric.distinct,
        })
        .collect();

    CompileState { aggregates, ..state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Dialect;

    #[test]
    fn test_plain_dimension_expr() {
        let registry = DimensionRegistry::retail();
        let region = registry.get_dimension("region").unwrap();
        assert_eq!(
            dimension_expr(region, &registry).to_sql(Dialect::Postgres),
            "\"s\".\"region\""
        );
    }

    #[test]
    fn test_time_dimension_expr() {
        let registry = DimensionRegistry::retail();
        let month = registry.get_dimension("month").unwrap();
        assert_eq!(
            dimension_expr(month, &registry).to_sql(Dialect::Sqlite),
            "STRFTIME('%Y-%m', \"t\".\"created_at\")"
        );
    }

    #[test]
    fn test_filter_field_overrides_display() {
        let registry = DimensionRegistry::retail();
        let store = registry.get_dimension("store").unwrap();
        assert_eq!(
            dimension_expr(store, &registry).to_sql(Dialect::Postgres),
            "\"s\".\"name\""
        );
        assert_eq!(
            filter_expr(store, &registry, false).to_sql(Dialect::Postgres),
            "\"s\".\"id\""
        );
    }

    #[test]
    fn test_numeric_filter_on_hour_uses_integer_part() {
        let registry = DimensionRegistry::retail();
        let hour = registry.get_dimension("hour").unwrap();
        assert_eq!(
            filter_expr(hour, &registry, true).to_sql(Dialect::Sqlite),
            "CAST(STRFTIME('%H', \"t\".\"created_at\") AS INTEGER)"
        );
        assert_eq!(
            filter_expr(hour, &registry, false).to_sql(Dialect::Sqlite),
            "STRFTIME('%H', \"t\".\"created_at\")"
        );
        let month = registry.get_dimension("month").unwrap();
        assert_eq!(
            filter_expr(month, &registry, true),
            dimension_expr(month, &registry)
        );
    }
}
