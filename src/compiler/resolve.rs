//! Validation stage: resolve every id in the request against the registry.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::warn;

use super::error::{CompileResult, ValidationError};
use super::output::{OrderItem, OrderTarget};
use crate::model::{
    Dimension, FilterOperator, Metric, ParamValue, QueryConfig, QueryFilter,
};
use crate::registry::DimensionRegistry;

/// A filter whose dimension and value shape have been checked.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedFilter<'r> {
    pub dimension: &'r Dimension,
    pub operator: FilterOperator,
    /// One value, except `In` (one or more) and `Between` (low, high)
    pub values: Vec<ParamValue>,
}

/// Half-open day range on the registry's date dimension.
#[derive(Debug, Clone)]
pub(crate) struct DateRange<'r> {
    pub dimension: &'r Dimension,
    pub from: Option<NaiveDate>,
    /// Day after the inclusive upper bound
    pub until: Option<NaiveDate>,
}

/// The request with every id replaced by its registry entry.
#[derive(Debug, Clone, Default)]
pub(crate) struct Resolved<'r> {
    pub dimensions: Vec<&'r Dimension>,
    pub metrics: Vec<&'r Metric>,
    pub filters: Vec<ResolvedFilter<'r>>,
    pub date_range: Option<DateRange<'r>>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
}

impl<'r> Resolved<'r> {
    /// Requested dimensions, then filter dimensions, first occurrence kept.
    ///
    /// Order-by targets are always requested dimensions or metrics, so they
    /// add nothing here. The date range is not a referenced dimension.
    pub fn referenced_dimensions(&self) -> Vec<&'r Dimension> {
        let mut seen = HashSet::new();
        self.dimensions
            .iter()
            .copied()
            .chain(self.filters.iter().map(|f| f.dimension))
            .filter(|d| seen.insert(d.id.as_str()))
            .collect()
    }
}

/// Resolve and validate `config`.
///
/// Checks run in this order: requested dimensions, metrics, filters, date
/// range, order-by targets, limit, pairwise compatibility, then a non-empty
/// selection. With
/// `strict = false` unknown metrics, filters on unknown dimensions and
/// unresolvable order targets are dropped instead of rejected.
pub(crate) fn resolve<'r>(
    config: &QueryConfig,
    registry: &'r DimensionRegistry,
    strict: bool,
) -> CompileResult<Resolved<'r>> {
    let mut seen = HashSet::new();
    let mut dimensions = Vec::new();
    for id in config.dimensions.iter().filter(|id| seen.insert(id.as_str())) {
        let dim = registry
            .get_dimension(id)
            .ok_or_else(|| ValidationError::unknown_dimension(id))?;
        dimensions.push(dim);
    }

    let mut seen = HashSet::new();
    let mut metrics = Vec::new();
    for id in config.metrics.iter().filter(|id| seen.insert(id.as_str())) {
        match registry.get_metric(id) {
            Some(metric) => metrics.push(metric),
            None if strict => return Err(ValidationError::unknown_metric(id)),
            None => warn!(metric = %id, "dropping unknown metric"),
        }
    }

    let mut filters = Vec::new();
    for filter in &config.filters {
        let Some(dimension) = registry.get_dimension(&filter.dimension) else {
            if strict {
                return Err(ValidationError::unknown_dimension(&filter.dimension));
            }
            warn!(dimension = %filter.dimension, "dropping filter on unknown dimension");
            continue;
        };
        filters.push(ResolvedFilter {
            dimension,
            operator: filter.operator,
            values: check_filter_value(filter, dimension)?,
        });
    }

    let date_range = resolve_date_range(config, registry)?;

    let mut seen = HashSet::new();
    let mut order_by = Vec::new();
    for entry in config
        .order_by
        .iter()
        .filter(|o| seen.insert(o.dimension.as_str()))
    {
        let target = if dimensions.iter().any(|d| d.id == entry.dimension) {
            OrderTarget::Dimension
        } else if metrics.iter().any(|m| m.id == entry.dimension) {
            OrderTarget::Metric
        } else if strict {
            return Err(ValidationError::UnknownOrderTarget {
                target: entry.dimension.clone(),
            });
        } else {
            warn!(target = %entry.dimension, "dropping unresolvable order target");
            continue;
        };
        order_by.push(OrderItem {
            alias: entry.dimension.clone(),
            target,
            direction: entry.direction,
        });
    }

    if config.limit == Some(0) {
        return Err(ValidationError::ZeroLimit);
    }

    let resolved = Resolved {
        dimensions,
        metrics,
        filters,
        date_range,
        order_by,
        limit: config.limit,
    };

    check_compatibility(&resolved.referenced_dimensions(), registry)?;

    if resolved.dimensions.is_empty() && resolved.metrics.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    Ok(resolved)
}

/// First incompatible pair in first-seen order, `i < j`.
fn check_compatibility(dimensions: &[&Dimension], registry: &DimensionRegistry) -> CompileResult<()> {
    for (i, left) in dimensions.iter().enumerate() {
        for right in &dimensions[i + 1..] {
            if !registry.can_combine(&left.id, &right.id) {
                return Err(ValidationError::IncompatibleDimensions {
                    left: left.id.clone(),
                    right: right.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn resolve_date_range<'r>(
    config: &QueryConfig,
    registry: &'r DimensionRegistry,
) -> CompileResult<Option<DateRange<'r>>> {
    if config.date_from.is_none() && config.date_to.is_none() {
        return Ok(None);
    }
    let dimension = registry
        .date_dimension()
        .ok_or_else(|| ValidationError::unknown_dimension("date"))?;

    let from = config.date_from.as_deref().map(parse_date).transpose()?;
    let until = match config.date_to.as_deref() {
        Some(to) => {
            let day = parse_date(to)?;
            let next = day
                .succ_opt()
                .ok_or_else(|| ValidationError::InvalidDate { value: to.into() })?;
            Some(next)
        }
        None => None,
    };

    Ok(Some(DateRange {
        dimension,
        from,
        until,
    }))
}

fn parse_date(value: &str) -> CompileResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate { value: value.into() })
}

fn check_filter_value(
    filter: &QueryFilter,
    dimension: &Dimension,
) -> CompileResult<Vec<ParamValue>> {
    let values = filter.value.values();
    match filter.operator {
        FilterOperator::Between => {
            if values.len() != 2 {
                return Err(ValidationError::BadBetweenArity {
                    dimension: filter.dimension.clone(),
                    found: values.len(),
                });
            }
        }
        FilterOperator::In => {
            if values.is_empty() {
                return Err(ValidationError::EmptyInList {
                    dimension: filter.dimension.clone(),
                });
            }
        }
        FilterOperator::Like => {
            if !matches!(filter.value.as_scalar(), Some(ParamValue::Text(_))) {
                return Err(bad_value(filter));
            }
        }
        FilterOperator::Eq | FilterOperator::Gte | FilterOperator::Lte => {
            if filter.value.as_scalar().is_none() {
                return Err(bad_value(filter));
            }
        }
    }

    // Time buckets compare as text, or as integers for year and hour.
    if let (Some(grain), None) = (dimension.grain, &dimension.filter_field) {
        let text = values.iter().all(|v| matches!(v, ParamValue::Text(_)));
        let numeric = grain.has_numeric_part() && values.iter().all(|v| v.is_numeric());
        if !text && !numeric {
            return Err(bad_value(filter));
        }
    }

    Ok(values.into_iter().cloned().collect())
}

fn bad_value(filter: &QueryFilter) -> ValidationError {
    ValidationError::BadFilterValue {
        dimension: filter.dimension.clone(),
        operator: filter.operator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ValidationErrorKind;
    use crate::model::{FilterValue, OrderBy};

    fn kind(config: &QueryConfig) -> ValidationErrorKind {
        resolve(config, &DimensionRegistry::retail(), true)
            .unwrap_err()
            .kind()
    }

    #[test]
    fn test_repeated_ids_collapse() {
        let registry = DimensionRegistry::retail();
        let config = QueryConfig::new()
            .dimensions(&["region", "city", "region"])
            .metrics(&["revenue", "revenue"]);
        let resolved = resolve(&config, &registry, true).unwrap();
        assert_eq!(resolved.dimensions.len(), 2);
        assert_eq!(resolved.metrics.len(), 1);
    }

    #[test]
    fn test_unknown_dimension_reported_before_unknown_metric() {
        let config = QueryConfig::new().metric("profit").dimension("nonexistent");
        assert_eq!(kind(&config), ValidationErrorKind::UnknownDimension);
    }

    #[test]
    fn test_filter_on_unknown_dimension() {
        let config = QueryConfig::new()
            .metric("revenue")
            .filter(QueryFilter::eq("warehouse", "W1"));
        assert_eq!(kind(&config), ValidationErrorKind::UnknownDimension);
    }

    #[test]
    fn test_between_arity() {
        let one = QueryConfig::new().metric("revenue").filter(QueryFilter::new(
            "hour",
            FilterOperator::Between,
            FilterValue::List(vec![ParamValue::Int(10)]),
        ));
        assert!(matches!(
            resolve(&one, &DimensionRegistry::retail(), true),
            Err(ValidationError::BadBetweenArity { found: 1, .. })
        ));

        let three = QueryConfig::new().metric("revenue").filter(QueryFilter::new(
            "hour",
            FilterOperator::Between,
            FilterValue::List(vec![
                ParamValue::Int(10),
                ParamValue::Int(20),
                ParamValue::Int(30),
            ]),
        ));
        assert!(matches!(
            resolve(&three, &DimensionRegistry::retail(), true),
            Err(ValidationError::BadBetweenArity { found: 3, .. })
        ));
    }

    #[test]
    fn test_empty_in_list() {
        let config = QueryConfig::new()
            .metric("revenue")
            .filter(QueryFilter::in_list::<&str>("region", vec![]));
        assert_eq!(kind(&config), ValidationErrorKind::EmptyInList);
    }

    #[test]
    fn test_scalar_operator_rejects_list() {
        let config = QueryConfig::new().metric("revenue").filter(QueryFilter::new(
            "region",
            FilterOperator::Eq,
            FilterValue::List(vec!["NCR".into(), "CAR".into()]),
        ));
        assert_eq!(kind(&config), ValidationErrorKind::BadFilterValue);
    }

    #[test]
    fn test_like_requires_text() {
        let config = QueryConfig::new()
            .metric("revenue")
            .filter(QueryFilter::like("store", 42));
        assert_eq!(kind(&config), ValidationErrorKind::BadFilterValue);
    }

    #[test]
    fn test_time_filter_value_types() {
        let registry = DimensionRegistry::retail();
        let accepted = [
            QueryFilter::between("hour", 9, 14),
            QueryFilter::between("hour", "09", "14"),
            QueryFilter::eq("year", 2024),
            QueryFilter::gte("day", "2024-01-15"),
        ];
        for filter in accepted {
            let config = QueryConfig::new().metric("revenue").filter(filter.clone());
            assert!(resolve(&config, &registry, true).is_ok(), "{:?}", filter);
        }

        let rejected = [
            QueryFilter::eq("month", 1),
            QueryFilter::gte("day", 20240115),
            QueryFilter::eq("hour", true),
            QueryFilter::new(
                "hour",
                FilterOperator::Between,
                FilterValue::List(vec![ParamValue::Int(9), "14".into()]),
            ),
        ];
        for filter in rejected {
            let config = QueryConfig::new().metric("revenue").filter(filter.clone());
            assert_eq!(kind(&config), ValidationErrorKind::BadFilterValue, "{:?}", filter);
        }
    }

    #[test]
    fn test_date_range_skips_compatibility() {
        let registry = DimensionRegistry::retail();
        let config = QueryConfig::new()
            .metric("revenue")
            .dimension("store")
            .date_range(Some("2024-01-01"), Some("2024-01-31"));
        let resolved = resolve(&config, &registry, true).unwrap();
        let range = resolved.date_range.unwrap();
        assert_eq!(range.dimension.id, "day");
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.until, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_date_range_rejects_bad_dates() {
        for (from, to) in [(Some("2024-13-01"), None), (None, Some("Jan 31"))] {
            let config = QueryConfig::new().metric("revenue").date_range(from, to);
            assert_eq!(kind(&config), ValidationErrorKind::InvalidDate);
        }
    }

    #[test]
    fn test_zero_limit() {
        let config = QueryConfig::new().metric("revenue").limit(0);
        assert_eq!(kind(&config), ValidationErrorKind::ZeroLimit);
    }

    #[test]
    fn test_order_target_must_be_requested() {
        let config = QueryConfig::new()
            .metric("revenue")
            .dimension("region")
            .order_by(OrderBy::desc("city"));
        assert_eq!(kind(&config), ValidationErrorKind::UnknownOrderTarget);
    }

    #[test]
    fn test_incompatible_through_filter() {
        let config = QueryConfig::new()
            .metric("revenue")
            .dimension("store")
            .filter(QueryFilter::eq("day", "2024-01-15"));
        assert_eq!(
            resolve(&config, &DimensionRegistry::retail(), true).unwrap_err(),
            ValidationError::IncompatibleDimensions {
                left: "store".into(),
                right: "day".into(),
            }
        );
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(kind(&QueryConfig::new()), ValidationErrorKind::EmptySelection);
    }

    #[test]
    fn test_lenient_drops_unknowns() {
        let registry = DimensionRegistry::retail();
        let config = QueryConfig::new()
            .metrics(&["revenue", "profit"])
            .dimension("region")
            .filter(QueryFilter::eq("warehouse", "W1"))
            .order_by(OrderBy::desc("margin"));
        let resolved = resolve(&config, &registry, false).unwrap();
        assert_eq!(resolved.metrics.len(), 1);
        assert!(resolved.filters.is_empty());
        assert!(resolved.order_by.is_empty());
    }

    #[test]
    fn test_lenient_still_rejects_unknown_dimension() {
        let config = QueryConfig::new().metric("revenue").dimension("nonexistent");
        assert!(resolve(&config, &DimensionRegistry::retail(), false).is_err());
    }

    #[test]
    fn test_order_target_resolves_to_metric() {
        let registry = DimensionRegistry::retail();
        let config = QueryConfig::new()
            .metric("revenue")
            .dimension("region")
            .order_by(OrderBy::desc("revenue"));
        let resolved = resolve(&config, &registry, true).unwrap();
        assert_eq!(resolved.order_by[0].target, OrderTarget::Metric);
    }
}
