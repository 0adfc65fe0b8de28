//! Metric catalog entries.

use serde::{Deserialize, Serialize};

/// Aggregate function applied by a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateFunction {
    /// SQL function name.
    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// A named aggregate over one column, e.g. `revenue = SUM(t.total_amount)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub function: AggregateFunction,
    pub column: String,
    /// Table owning `column`; a non-fact table pulls its join chain in
    pub table: String,
    #[serde(default)]
    pub distinct: bool,
}

impl Metric {
    pub fn new(id: &str, function: AggregateFunction, table: &str, column: &str) -> Self {
        Self {
            id: id.into(),
            function,
            column: column.into(),
            table: table.into(),
            distinct: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}
