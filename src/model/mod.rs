//! Data model shared by the registry, compiler and executor.
//!
//! Registry-side types (`Dimension`, `Metric`, `TableLink`, `FactTable`) are
//! loaded from registry definition files with snake_case keys. Request-side
//! types (`QueryConfig`, `QueryFilter`) follow the camelCase JSON contract
//! used by dashboard callers.

pub mod dimension;
pub mod metric;
pub mod query;
pub mod table;

pub use dimension::Dimension;
pub use metric::{AggregateFunction, Metric};
pub use query::{
    FilterOperator, FilterValue, OrderBy, ParamValue, QueryConfig, QueryFilter, SortDirection,
};
pub use table::{BaseFilter, FactTable, JoinKind, TableLink};
