//! Request-level API: date ranges, templates and the configured engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::ResultMemo;
use crate::compiler::{compile_with, CompileOptions, CompiledQuery, ValidationError};
use crate::config::{EngineKind, SettingsError, Settings};
use crate::executor::{
    ExecuteOptions, ExecutionError, QueryExecutor, QueryResult, SqlEngine, SqliteEngine,
    WorkerEngine,
};
use crate::model::{QueryConfig, QueryFilter};
use crate::registry::{DimensionRegistry, RegistryDefinition, RegistryError};
use crate::templates;
use crate::worker::WorkerError;

/// Result type for service construction and template runs.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Engine(#[from] ExecutionError),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
}

/// A dashboard-style request: a query plus an optional inclusive date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
    /// ISO date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl From<AnalyticsRequest> for QueryConfig {
    fn from(request: AnalyticsRequest) -> Self {
        QueryConfig {
            metrics: request.metrics,
            dimensions: request.dimensions,
            filters: request.filters,
            order_by: Vec::new(),
            limit: request.limit,
            date_from: request.date_from,
            date_to: request.date_to,
        }
    }
}

/// Compiles against one registry and executes on one engine.
#[derive(Clone)]
pub struct AnalyticsService {
    registry: Arc<DimensionRegistry>,
    executor: QueryExecutor,
    strict: bool,
}

impl AnalyticsService {
    pub fn new(registry: Arc<DimensionRegistry>, executor: QueryExecutor) -> Self {
        Self {
            registry,
            executor,
            strict: true,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build the registry, engine and executor described by `settings`.
    pub async fn from_settings(settings: &Settings) -> ServiceResult<Self> {
        let registry = Arc::new(load_registry(settings)?);
        let engine = build_engine(settings).await?;
        let executor = QueryExecutor::from_settings(engine, &settings.engine)
            .with_memo(ResultMemo::from_settings(&settings.cache));
        Ok(Self::new(registry, executor).with_strict(settings.compiler.strict))
    }

    pub fn registry(&self) -> &DimensionRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub async fn query(&self, request: AnalyticsRequest) -> Result<QueryResult, ValidationError> {
        self.query_with(request, &ExecuteOptions::default()).await
    }

    pub async fn query_with(
        &self,
        request: AnalyticsRequest,
        options: &ExecuteOptions,
    ) -> Result<QueryResult, ValidationError> {
        let compiled = self.compile_only(request)?;
        Ok(self.executor.execute_with(&compiled, options).await)
    }

    /// Run a full `QueryConfig`, order-by included, over an optional date range.
    pub async fn run_config(
        &self,
        config: QueryConfig,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<QueryResult, ValidationError> {
        let compiled = self.compile(config, date_from, date_to)?;
        Ok(self.executor.execute(&compiled).await)
    }

    /// Compile for the engine's dialect without executing.
    pub fn compile_only(&self, request: AnalyticsRequest) -> Result<CompiledQuery, ValidationError> {
        self.compile(request.into(), None, None)
    }

    pub async fn run_template(
        &self,
        name: &str,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> ServiceResult<QueryResult> {
        let config =
            templates::get(name).ok_or_else(|| ServiceError::UnknownTemplate(name.to_string()))?;
        let compiled = self.compile(config, date_from, date_to)?;
        info!(template = name, "running template");
        Ok(self.executor.execute(&compiled).await)
    }

    /// Explicit bounds replace those already on `config`.
    fn compile(
        &self,
        mut config: QueryConfig,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<CompiledQuery, ValidationError> {
        if let Some(from) = date_from {
            config.date_from = Some(from.into());
        }
        if let Some(to) = date_to {
            config.date_to = Some(to.into());
        }
        let options = CompileOptions::default()
            .with_dialect(self.executor.engine().dialect())
            .with_strict(self.strict);
        compile_with(&config, &self.registry, &options)
    }
}

/// The configured registry file, or the built-in retail registry.
pub fn load_registry(settings: &Settings) -> ServiceResult<DimensionRegistry> {
    match settings.registry_path()? {
        Some(path) => Ok(DimensionRegistry::from_definition(RegistryDefinition::load(
            &path,
        )?)?),
        None => Ok(DimensionRegistry::retail()),
    }
}

async fn build_engine(settings: &Settings) -> ServiceResult<Arc<dyn SqlEngine>> {
    let connection = settings.engine.resolved_connection()?;
    match settings.engine.kind {
        EngineKind::Sqlite => Ok(Arc::new(SqliteEngine::from_connection_string(&connection)?)),
        EngineKind::Worker => {
            let path = settings.worker_path()?.ok_or(WorkerError::NotFound)?;
            let engine = WorkerEngine::spawn(
                path,
                settings.engine.driver_type()?,
                connection,
                &settings.engine.pool,
                settings.engine.timeout(),
            )
            .await?;
            Ok(Arc::new(engine))
        }
    }
}
