//! Registry construction errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while loading or validating a registry definition.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported registry file extension: {0}")]
    UnsupportedFormat(PathBuf),

    /// Dimension and metric ids share one namespace: they become column aliases.
    #[error("Duplicate dimension or metric id: {0}")]
    DuplicateId(String),

    #[error("Dimension '{dimension}' has unknown parent '{parent}'")]
    UnknownParent { dimension: String, parent: String },

    #[error("Dimension hierarchy cycle through '{0}'")]
    HierarchyCycle(String),

    #[error("'{owner}' references unregistered table '{table}'")]
    UnknownTable { owner: String, table: String },

    #[error("Table '{table}' links to unknown parent table '{parent}'")]
    UnknownLinkParent { table: String, parent: String },

    #[error("Table link cycle through '{0}'")]
    LinkCycle(String),

    #[error("Table '{0}' is linked more than once")]
    DuplicateTable(String),

    #[error("Table alias '{0}' is used more than once")]
    DuplicateAlias(String),

    #[error("Incompatible pair references unknown dimension '{0}'")]
    UnknownIncompatibleDimension(String),

    #[error("Date dimension '{0}' is not a registered time dimension")]
    InvalidDateDimension(String),
}
