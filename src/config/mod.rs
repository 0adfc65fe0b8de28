//! Configuration module for starql.
//!
//! Handles the settings file, environment variable expansion and engine drivers.

mod connection;
mod settings;

pub use connection::Driver;
pub use settings::{
    expand_env_vars, CacheSettings, CompilerSettings, EngineKind, EngineSettings, PoolSettings,
    RegistrySettings, Settings, SettingsError, WorkerSettings,
};
