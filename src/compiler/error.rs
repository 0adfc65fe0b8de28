//! Compile-time validation errors.
//!
//! Every variant is returned before any SQL is produced or executed.

use serde::Serialize;
use thiserror::Error;

use crate::model::FilterOperator;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, ValidationError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown dimension: {id}")]
    UnknownDimension { id: String },

    #[error("Unknown metric: {id}")]
    UnknownMetric { id: String },

    #[error("Dimensions '{left}' and '{right}' cannot be combined")]
    IncompatibleDimensions { left: String, right: String },

    #[error("BETWEEN filter on '{dimension}' needs exactly 2 values, got {found}")]
    BadBetweenArity { dimension: String, found: usize },

    #[error("IN filter on '{dimension}' has an empty value list")]
    EmptyInList { dimension: String },

    #[error("Filter on '{dimension}' has a value of the wrong shape for '{operator}'")]
    BadFilterValue {
        dimension: String,
        operator: FilterOperator,
    },

    #[error("Date range bound '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { value: String },

    #[error("ORDER BY target '{target}' is neither a requested dimension nor a requested metric")]
    UnknownOrderTarget { target: String },

    #[error("LIMIT must be at least 1")]
    ZeroLimit,

    #[error("Query selects no dimensions and no metrics")]
    EmptySelection,
}

/// Fieldless category of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationErrorKind {
    UnknownDimension,
    UnknownMetric,
    IncompatibleDimensions,
    BadBetweenArity,
    EmptyInList,
    BadFilterValue,
    InvalidDate,
    UnknownOrderTarget,
    ZeroLimit,
    EmptySelection,
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::UnknownDimension { .. } => ValidationErrorKind::UnknownDimension,
            Self::UnknownMetric { .. } => ValidationErrorKind::UnknownMetric,
            Self::IncompatibleDimensions { .. } => ValidationErrorKind::IncompatibleDimensions,
            Self::BadBetweenArity { .. } => ValidationErrorKind::BadBetweenArity,
            Self::EmptyInList { .. } => ValidationErrorKind::EmptyInList,
            Self::BadFilterValue { .. } => ValidationErrorKind::BadFilterValue,
            Self::InvalidDate { .. } => ValidationErrorKind::InvalidDate,
            Self::UnknownOrderTarget { .. } => ValidationErrorKind::UnknownOrderTarget,
            Self::ZeroLimit => ValidationErrorKind::ZeroLimit,
            Self::EmptySelection => ValidationErrorKind::EmptySelection,
        }
    }

    pub(crate) fn unknown_dimension(id: &str) -> Self {
        Self::UnknownDimension { id: id.into() }
    }

    pub(crate) fn unknown_metric(id: &str) -> Self {
        Self::UnknownMetric { id: id.into() }
    }
}
