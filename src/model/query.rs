//! Request-side types: what the caller asks for.
//!
//! ```json
//! {
//!   "metrics": ["revenue", "transactions"],
//!   "dimensions": ["region", "month"],
//!   "filters": [{"dimension": "region", "operator": "eq", "value": "NCR"}],
//!   "orderBy": [{"dimension": "month", "direction": "asc"}],
//!   "limit": 100
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single bound value.
///
/// Filter values only ever reach the engine through this type, as bind
/// parameters next to the SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ParamValue::Int(_) | ParamValue::Float(_))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Int(n) => serde_json::Value::from(*n),
            ParamValue::Float(f) => serde_json::Value::from(*f),
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.into())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n.into())
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

/// Filter operand: one value or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    List(Vec<ParamValue>),
    Scalar(ParamValue),
}

impl FilterValue {
    /// The single value for scalar operators. A one-element list counts.
    pub fn as_scalar(&self) -> Option<&ParamValue> {
        match self {
            FilterValue::Scalar(v) => Some(v),
            FilterValue::List(values) if values.len() == 1 => values.first(),
            FilterValue::List(_) => None,
        }
    }

    /// All values, a scalar counting as a list of one.
    pub fn values(&self) -> Vec<&ParamValue> {
        match self {
            FilterValue::Scalar(v) => vec![v],
            FilterValue::List(values) => values.iter().collect(),
        }
    }
}

impl From<ParamValue> for FilterValue {
    fn from(value: ParamValue) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Scalar(s.into())
    }
}

impl From<Vec<ParamValue>> for FilterValue {
    fn from(values: Vec<ParamValue>) -> Self {
        FilterValue::List(values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    In,
    Gte,
    Lte,
    Like,
    Between,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::In => "in",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::Between => "between",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub dimension: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl QueryFilter {
    pub fn new(dimension: &str, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            dimension: dimension.into(),
            operator,
            value,
        }
    }

    pub fn eq(dimension: &str, value: impl Into<ParamValue>) -> Self {
        Self::new(dimension, FilterOperator::Eq, FilterValue::Scalar(value.into()))
    }

    pub fn gte(dimension: &str, value: impl Into<ParamValue>) -> Self {
        Self::new(dimension, FilterOperator::Gte, FilterValue::Scalar(value.into()))
    }

    pub fn lte(dimension: &str, value: impl Into<ParamValue>) -> Self {
        Self::new(dimension, FilterOperator::Lte, FilterValue::Scalar(value.into()))
    }

    pub fn like(dimension: &str, value: impl Into<ParamValue>) -> Self {
        Self::new(dimension, FilterOperator::Like, FilterValue::Scalar(value.into()))
    }

    pub fn in_list<V: Into<ParamValue>>(dimension: &str, values: Vec<V>) -> Self {
        Self::new(
            dimension,
            FilterOperator::In,
            FilterValue::List(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn between(
        dimension: &str,
        low: impl Into<ParamValue>,
        high: impl Into<ParamValue>,
    ) -> Self {
        Self::new(
            dimension,
            FilterOperator::Between,
            FilterValue::List(vec![low.into(), high.into()]),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY entry. `dimension` names a requested dimension or metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub dimension: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(target: &str) -> Self {
        Self {
            dimension: target.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(target: &str) -> Self {
        Self {
            dimension: target.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Declarative description of one analytical query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Inclusive `YYYY-MM-DD` bounds on the registry's date dimension.
    ///
    /// Applied to the raw timestamp column and exempt from the
    /// dimension compatibility check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn metric(mut self, id: &str) -> Self {
        self.metrics.push(id.into());
        self
    }

    pub fn metrics(mut self, ids: &[&str]) -> Self {
        self.metrics.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn dimension(mut self, id: &str) -> Self {
        self.dimensions.push(id.into());
        self
    }

    pub fn dimensions(mut self, ids: &[&str]) -> Self {
        self.dimensions.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restrict to a date range; `None` leaves that side open.
    pub fn date_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_from = from.map(Into::into);
        self.date_to = to.map(Into::into);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard_config() {
        let config = QueryConfig::from_json_str(
            r#"{
                "metrics": ["revenue", "transactions"],
                "dimensions": ["region", "month"],
                "filters": [{"dimension": "region", "operator": "eq", "value": "NCR"}],
                "orderBy": [{"dimension": "month", "direction": "asc"}],
                "limit": 100
            }"#,
        )
        .unwrap();

        assert_eq!(config.metrics, vec!["revenue", "transactions"]);
        assert_eq!(config.filters[0].operator, FilterOperator::Eq);
        assert_eq!(
            config.filters[0].value,
            FilterValue::Scalar(ParamValue::Text("NCR".into()))
        );
        assert_eq!(config.order_by[0], OrderBy::asc("month"));
        assert_eq!(config.limit, Some(100));
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let config = QueryConfig::from_json_str(r#"{"metrics": ["revenue"]}"#).unwrap();
        assert!(config.dimensions.is_empty());
        assert!(config.filters.is_empty());
        assert!(config.order_by.is_empty());
        assert_eq!(config.limit, None);
    }

    #[test]
    fn test_param_value_untagged() {
        let values: Vec<ParamValue> = serde_json::from_str(r#"[10, 2.5, "x", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ParamValue::Int(10),
                ParamValue::Float(2.5),
                ParamValue::Text("x".into()),
                ParamValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_filter_value_shapes() {
        let scalar = FilterValue::from("NCR");
        assert_eq!(scalar.as_scalar(), Some(&ParamValue::Text("NCR".into())));
        assert_eq!(scalar.values().len(), 1);

        let single = FilterValue::List(vec![ParamValue::Int(5)]);
        assert_eq!(single.as_scalar(), Some(&ParamValue::Int(5)));

        let pair = FilterValue::List(vec![ParamValue::Int(10), ParamValue::Int(20)]);
        assert_eq!(pair.as_scalar(), None);
        assert_eq!(pair.values().len(), 2);
    }

    #[test]
    fn test_direction_defaults_to_asc() {
        let order: OrderBy = serde_json::from_str(r#"{"dimension": "revenue"}"#).unwrap();
        assert_eq!(order.direction, SortDirection::Asc);
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let config = QueryConfig::new()
            .metric("revenue")
            .dimension("region")
            .order_by(OrderBy::desc("revenue"));
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("orderBy").is_some());
        assert!(json.get("limit").is_none());
    }
}
