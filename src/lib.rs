//! # starql
//!
//! A dynamic analytical query compiler for a retail star schema.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        QueryConfig (metrics, dimensions, filters)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler: validate against registry]
//! ┌─────────────────────────────────────────────────────────┐
//! │       DimensionRegistry (hierarchies, table links,       │
//! │            metric catalog, incompatible pairs)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler: joins, select, where, order]
//! ┌─────────────────────────────────────────────────────────┐
//! │     CompiledQuery (parameterized SQL + bind values)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [executor: SQLite or worker engine]
//! ┌─────────────────────────────────────────────────────────┐
//! │          QueryResult (rows | error, sql, duration)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use starql::compiler::compile;
//! use starql::model::QueryConfig;
//! use starql::registry::DimensionRegistry;
//!
//! let registry = DimensionRegistry::retail();
//! let config = QueryConfig::new().metric("revenue").dimension("region").limit(5);
//! let compiled = compile(&config, &registry).unwrap();
//! assert!(compiled.sql().contains("INNER JOIN \"stores\" AS \"s\""));
//! ```

pub mod cache;
pub mod compiler;
pub mod config;
pub mod executor;
pub mod model;
pub mod registry;
pub mod service;
pub mod sql;
pub mod templates;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compiler::{
        compile, compile_with, CompileOptions, CompiledQuery, ValidationError, ValidationErrorKind,
    };
    pub use crate::executor::{
        ExecuteOptions, ExecutionError, QueryExecutor, QueryResult, SqlEngine, SqliteEngine,
    };
    pub use crate::model::{
        FilterOperator, FilterValue, OrderBy, ParamValue, QueryConfig, QueryFilter, SortDirection,
    };
    pub use crate::registry::DimensionRegistry;
    pub use crate::service::{AnalyticsRequest, AnalyticsService};
    pub use crate::sql::Dialect;
}

// Also export at crate root for convenience
pub use compiler::{compile, compile_with, CompileOptions, CompiledQuery};
pub use model::QueryConfig;
pub use registry::DimensionRegistry;
pub use sql::Dialect;
