//! TOML-based configuration for starql.
//!
//! Supports a config file (starql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! strict = true
//! dialect = "postgres"
//!
//! [registry]
//! path = "./registry.toml"
//!
//! [engine]
//! kind = "worker"
//! driver = "postgres"
//! connection = "${RETAIL_DB_URL}"
//! timeout_ms = 15000
//! max_in_flight = 8
//!
//! [engine.worker]
//! path = "./starql-worker"
//!
//! [engine.pool]
//! max_idle_conns = 5
//! max_open_conns = 10
//! conn_max_lifetime = "5m"
//! conn_max_idle_time = "1m"
//!
//! [cache]
//! enabled = true
//! ttl_seconds = 30
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::connection::Driver;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub registry: RegistrySettings,
    pub engine: EngineSettings,
    pub cache: CacheSettings,
}

/// Compiler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Reject unknown metrics, filters and order targets.
    pub strict: bool,

    /// Dialect for `compile` when no engine is involved.
    pub dialect: String,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            strict: true,
            dialect: "postgres".to_string(),
        }
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// TOML or JSON registry definition. The built-in retail registry is used when unset.
    pub path: Option<String>,
}

/// Which engine executes compiled queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Embedded SQLite database
    #[default]
    Sqlite,
    /// External worker process
    Worker,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    pub kind: EngineKind,

    /// Connection string or SQLite path (supports ${ENV_VAR} expansion).
    pub connection: String,

    /// Database driver for the worker (postgres, mssql, duckdb, mysql, sqlite).
    pub driver: Option<String>,

    /// Per-query timeout in milliseconds.
    pub timeout_ms: u64,

    /// Maximum concurrently executing queries.
    pub max_in_flight: usize,

    /// Worker process configuration.
    pub worker: WorkerSettings,

    /// Connection pool settings, owned by the worker.
    pub pool: PoolSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            kind: EngineKind::Sqlite,
            connection: ":memory:".to_string(),
            driver: None,
            timeout_ms: 30_000,
            max_in_flight: 8,
            worker: WorkerSettings::default(),
            pool: PoolSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Get the driver type. SQLite when unset.
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        match &self.driver {
            Some(driver) => Driver::from_str(driver),
            None => Ok(Driver::Sqlite),
        }
    }

    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary.
    pub path: Option<String>,
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of idle connections per pool.
    pub max_idle_conns: u32,

    /// Maximum number of open connections per pool.
    pub max_open_conns: u32,

    /// Maximum connection lifetime (e.g., "5m", "1h").
    pub conn_max_lifetime: String,

    /// Maximum connection idle time (e.g., "1m", "30s").
    pub conn_max_idle_time: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 5,
            max_open_conns: 10,
            conn_max_lifetime: "5m".to_string(),
            conn_max_idle_time: "1m".to_string(),
        }
    }
}

impl PoolSettings {
    /// Convert to worker command-line arguments.
    pub fn to_worker_args(&self) -> Vec<String> {
        vec![
            "-pool".to_string(),
            format!("-pool-max-idle={}", self.max_idle_conns),
            format!("-pool-max-open={}", self.max_open_conns),
            format!("-pool-conn-lifetime={}", self.conn_max_lifetime),
            format!("-pool-conn-idle={}", self.conn_max_idle_time),
        ]
    }
}

/// Result memo configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_seconds: 30,
            max_entries: 1024,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.engine.max_in_flight == 0 {
            return Err(SettingsError::InvalidConfig(
                "engine.max_in_flight must be at least 1".into(),
            ));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(SettingsError::InvalidConfig(
                "cache.max_entries must be at least 1 when the cache is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `STARQL_CONFIG`
    /// 2. `./starql.toml`
    /// 3. `~/.config/starql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("STARQL_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("starql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("starql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// The dialect `compile` uses when none is given.
    pub fn compiler_dialect(&self) -> Result<Dialect, SettingsError> {
        Dialect::parse(&self.compiler.dialect)
            .ok_or_else(|| SettingsError::UnknownDialect(self.compiler.dialect.clone()))
    }

    /// Registry definition path with environment variables expanded.
    pub fn registry_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.registry
            .path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    /// Get the worker binary path.
    ///
    /// Returns the configured path, or the first common location that exists.
    pub fn worker_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        if let Some(path) = &self.engine.worker.path {
            return Ok(Some(PathBuf::from(expand_env_vars(path)?)));
        }

        let candidates = ["./starql-worker", "./worker/starql-worker"];
        Ok(candidates
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            // ${VAR}
            let name = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }
        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_braces() {
        env::set_var("STARQL_TEST_VAR", "hello");
        assert_eq!(expand_env_vars("${STARQL_TEST_VAR}").unwrap(), "hello");
        assert_eq!(
            expand_env_vars("prefix_${STARQL_TEST_VAR}_suffix").unwrap(),
            "prefix_hello_suffix"
        );
        env::remove_var("STARQL_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        env::set_var("STARQL_TEST_VAR2", "world");
        assert_eq!(expand_env_vars("$STARQL_TEST_VAR2").unwrap(), "world");
        assert_eq!(expand_env_vars("$STARQL_TEST_VAR2!").unwrap(), "world!");
        env::remove_var("STARQL_TEST_VAR2");
    }

    #[test]
    fn test_expand_env_vars_lone_dollar() {
        assert_eq!(expand_env_vars("cost $ 5").unwrap(), "cost $ 5");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("${NONEXISTENT_VAR_12345}");
        assert!(matches!(result, Err(SettingsError::MissingEnvVar(_))));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[compiler]
strict = false
dialect = "mssql"

[registry]
path = "./registry.json"

[engine]
kind = "worker"
driver = "postgres"
connection = "postgres://localhost/retail"
timeout_ms = 5000

[engine.pool]
max_idle_conns = 10
max_open_conns = 20

[cache]
enabled = true
ttl_seconds = 60
"#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert!(!settings.compiler.strict);
        assert_eq!(settings.compiler_dialect().unwrap(), Dialect::TSql);
        assert_eq!(
            settings.registry_path().unwrap(),
            Some(PathBuf::from("./registry.json"))
        );
        assert_eq!(settings.engine.kind, EngineKind::Worker);
        assert_eq!(settings.engine.driver_type().unwrap(), Driver::Postgres);
        assert_eq!(settings.engine.timeout(), Duration::from_millis(5000));
        assert_eq!(settings.engine.max_in_flight, 8);
        assert_eq!(settings.engine.pool.max_idle_conns, 10);
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.ttl(), Duration::from_secs(60));
        assert_eq!(settings.cache.max_entries, 1024);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert!(settings.compiler.strict);
        assert_eq!(settings.compiler_dialect().unwrap(), Dialect::Postgres);
        assert_eq!(settings.engine.kind, EngineKind::Sqlite);
        assert_eq!(settings.engine.connection, ":memory:");
        assert_eq!(settings.engine.timeout_ms, 30_000);
        assert!(!settings.cache.enabled);
        assert!(settings.registry_path().unwrap().is_none());
    }

    #[test]
    fn test_unknown_dialect() {
        let mut settings = Settings::default();
        settings.compiler.dialect = "oracle".into();
        assert!(matches!(
            settings.compiler_dialect(),
            Err(SettingsError::UnknownDialect(_))
        ));
    }

    #[test]
    fn test_zero_in_flight_rejected() {
        let settings: Settings = toml::from_str("[engine]\nmax_in_flight = 0\n").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidConfig(_))
        ));
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_pool_args() {
        let pool = PoolSettings::default();
        let args = pool.to_worker_args();

        assert!(args.contains(&"-pool".to_string()));
        assert!(args.contains(&"-pool-max-idle=5".to_string()));
        assert!(args.contains(&"-pool-max-open=10".to_string()));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Settings::from_file("/nonexistent/starql.toml"),
            Err(SettingsError::FileNotFound(_))
        ));
    }
}
