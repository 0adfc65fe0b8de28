//! WHERE stage: base predicate plus one parameterized predicate per filter.

use super::resolve::{DateRange, ResolvedFilter};
use super::select::{filter_expr, raw_column};
use super::CompileState;
use crate::model::{FilterOperator, ParamValue};
use crate::registry::DimensionRegistry;
use crate::sql::expr::{lit_str, param, table_col};
use crate::sql::{Expr, ExprExt};

/// Build the WHERE predicates and the bind list.
///
/// The base predicate is registry data and stays a literal. Every filter
/// value becomes a placeholder; `params` follows statement text order so
/// positional placeholders (`?`) bind correctly. The date range comes last,
/// as a half-open range on the raw timestamp column.
pub(crate) fn build_where<'r>(
    state: CompileState<'r>,
    registry: &'r DimensionRegistry,
) -> CompileState<'r> {
    let fact = registry.fact();
    let mut predicates = Vec::new();
    if let Some(base) = &fact.base_filter {
        predicates.push(table_col(&fact.alias, &base.column).eq(lit_str(&base.value)));
    }

    let mut params = Vec::new();
    for filter in &state.resolved.filters {
        predicates.push(filter_predicate(filter, registry, &mut params));
    }
    if let Some(range) = &state.resolved.date_range {
        predicates.extend(date_range_predicates(range, registry, &mut params));
    }

    CompileState {
        predicates,
        params,
        ..state
    }
}

fn filter_predicate(
    filter: &ResolvedFilter<'_>,
    registry: &DimensionRegistry,
    params: &mut Vec<ParamValue>,
) -> Expr {
    let numeric = filter.values.iter().all(ParamValue::is_numeric);
    let target = filter_expr(filter.dimension, registry, numeric);
    let mut bind = |value: &ParamValue| {
        params.push(value.clone());
        param(params.len())
    };

    match filter.operator {
        FilterOperator::Eq => target.eq(bind(&filter.values[0])),
        FilterOperator::Gte => target.gte(bind(&filter.values[0])),
        FilterOperator::Lte => target.lte(bind(&filter.values[0])),
        FilterOperator::Like => {
            let pattern = lit_str("%").concat(bind(&filter.values[0])).concat(lit_str("%"));
            target.like(pattern)
        }
        FilterOperator::In => {
            let values = filter.values.iter().map(&mut bind).collect();
            target.in_list(values)
        }
        FilterOperator::Between => {
            let low = bind(&filter.values[0]);
            let high = bind(&filter.values[1]);
            target.between(low, high)
        }
    }
}

fn date_range_predicates(
    range: &DateRange<'_>,
    registry: &DimensionRegistry,
    params: &mut Vec<ParamValue>,
) -> Vec<Expr> {
    let column = raw_column(range.dimension, registry);
    let mut predicates = Vec::new();
    if let Some(from) = range.from {
        params.push(ParamValue::Text(from.to_string()));
        predicates.push(column.clone().gte(param(params.len())));
    }
    if let Some(until) = range.until {
        params.push(ParamValue::Text(until.to_string()));
        predicates.push(column.lt(param(params.len())));
    }
    predicates
}
