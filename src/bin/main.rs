//! starql CLI - compile and run retail analytics queries
//!
//! Usage:
//!   starql compile <config.json> [--dialect <dialect>] [--registry <file>] [--lenient] [--format sql|json]
//!   starql run <config.json> [--date-from <date>] [--date-to <date>]
//!   starql template <name> [--dialect <dialect>]
//!   starql templates
//!   starql registry [--registry <file>]
//!
//! Examples:
//!   starql compile queries/regional.json --dialect tsql
//!   starql run queries/regional.json --date-from 2024-01-01 --date-to 2024-03-31
//!   starql template category_mix --dialect mysql

use clap::{Parser, Subcommand, ValueEnum};
use starql::compiler::{compile_with, CompileOptions};
use starql::config::Settings;
use starql::model::QueryConfig;
use starql::registry::{DimensionRegistry, RegistryDefinition};
use starql::service::{load_registry, AnalyticsService};
use starql::sql::Dialect;
use starql::templates;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starql")]
#[command(about = "starql - compile retail analytics queries to parameterized SQL")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to STARQL_CONFIG, ./starql.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a QueryConfig JSON file to SQL
    Compile {
        /// Path to the QueryConfig JSON file
        file: PathBuf,

        /// SQL dialect to generate (defaults to compiler.dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Registry definition (TOML or JSON) to compile against
        #[arg(short, long)]
        registry: Option<PathBuf>,

        /// Drop unknown metrics, filters and order targets instead of failing
        #[arg(long)]
        lenient: bool,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,
    },

    /// Compile and execute a QueryConfig with the configured engine
    Run {
        /// Path to the QueryConfig JSON file
        file: PathBuf,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        date_from: Option<String>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        date_to: Option<String>,
    },

    /// Print a template's config and SQL
    Template {
        name: String,

        /// SQL dialect to generate (defaults to compiler.dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// List query templates
    Templates,

    /// Print the registry's dimensions and metrics
    Registry {
        /// Registry definition (TOML or JSON); built-in retail registry if omitted
        #[arg(short, long)]
        registry: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
    Sqlite,
    Mysql,
    Tsql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Tsql => Dialect::TSql,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// SQL only
    Sql,
    /// The compiled query with params, joins and aliases
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile {
            file,
            dialect,
            registry,
            lenient,
            format,
        } => cmd_compile(&settings, &file, dialect, registry, lenient, format),
        Commands::Run {
            file,
            date_from,
            date_to,
        } => cmd_run(&settings, &file, date_from, date_to).await,
        Commands::Template { name, dialect } => cmd_template(&settings, &name, dialect),
        Commands::Templates => cmd_templates(),
        Commands::Registry { registry } => cmd_registry(&settings, registry),
    }
}

fn read_config(file: &Path) -> Result<QueryConfig, String> {
    let source = fs::read_to_string(file)
        .map_err(|e| format!("Error reading file '{}': {}", file.display(), e))?;
    QueryConfig::from_json_str(&source)
        .map_err(|e| format!("Error parsing '{}': {}", file.display(), e))
}

fn resolve_registry(settings: &Settings, path: Option<PathBuf>) -> Result<DimensionRegistry, String> {
    match path {
        Some(path) => RegistryDefinition::load(&path)
            .and_then(DimensionRegistry::from_definition)
            .map_err(|e| format!("Error loading registry '{}': {}", path.display(), e)),
        None => load_registry(settings).map_err(|e| format!("Error loading registry: {}", e)),
    }
}

fn resolve_dialect(settings: &Settings, arg: Option<DialectArg>) -> Result<Dialect, String> {
    match arg {
        Some(arg) => Ok(arg.into()),
        None => settings.compiler_dialect().map_err(|e| e.to_string()),
    }
}

fn cmd_compile(
    settings: &Settings,
    file: &Path,
    dialect: Option<DialectArg>,
    registry: Option<PathBuf>,
    lenient: bool,
    format: OutputFormat,
) -> ExitCode {
    let prepared = read_config(file).and_then(|config| {
        Ok((
            config,
            resolve_registry(settings, registry)?,
            resolve_dialect(settings, dialect)?,
        ))
    });
    let (config, registry, dialect) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = CompileOptions::default()
        .with_dialect(dialect)
        .with_strict(settings.compiler.strict && !lenient);

    match compile_with(&config, &registry, &options) {
        Ok(compiled) => {
            match format {
                OutputFormat::Sql => println!("{}", compiled.sql()),
                OutputFormat::Json => match serde_json::to_string_pretty(&compiled) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing compiled query: {}", e);
                        return ExitCode::FAILURE;
                    }
                },
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_run(
    settings: &Settings,
    file: &Path,
    date_from: Option<String>,
    date_to: Option<String>,
) -> ExitCode {
    let config = match read_config(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match AnalyticsService::from_settings(settings).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error starting engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match service
        .run_config(config, date_from.as_deref(), date_to.as_deref())
        .await
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Validation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_template(settings: &Settings, name: &str, dialect: Option<DialectArg>) -> ExitCode {
    let Some(config) = templates::get(name) else {
        eprintln!("Unknown template '{}'. Run `starql templates` to list them.", name);
        return ExitCode::FAILURE;
    };
    let prepared = resolve_registry(settings, None)
        .and_then(|registry| Ok((registry, resolve_dialect(settings, dialect)?)));
    let (registry, dialect) = match prepared {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = CompileOptions::default().with_dialect(dialect);
    match (
        serde_json::to_string_pretty(&config),
        compile_with(&config, &registry, &options),
    ) {
        (Ok(json), Ok(compiled)) => {
            println!("-- config\n{}\n", json);
            println!("-- sql ({})\n{}", dialect, compiled.sql());
            ExitCode::SUCCESS
        }
        (Err(e), _) => {
            eprintln!("Error serializing template: {}", e);
            ExitCode::FAILURE
        }
        (_, Err(e)) => {
            eprintln!("Validation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_templates() -> ExitCode {
    let all = templates::all();
    let width = all.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, description) in all {
        println!("  {:width$}  {}", name, description, width = width);
    }
    ExitCode::SUCCESS
}

fn cmd_registry(settings: &Settings, registry: Option<PathBuf>) -> ExitCode {
    let registry = match resolve_registry(settings, registry) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Registry v{} (fact: {} AS {})",
        registry.version(),
        registry.fact().table,
        registry.fact().alias
    );

    println!("\nDimensions:");
    for dim in registry.dimensions() {
        let path = registry
            .hierarchy_path(&dim.id)
            .map(|p| p.iter().map(|d| d.id.as_str()).collect::<Vec<_>>().join(" > "))
            .unwrap_or_default();
        let grain = dim
            .grain
            .map(|g| format!(" [{}]", g.as_str()))
            .unwrap_or_default();
        println!("  {:<16} {}.{}{}  ({})", dim.id, dim.table, dim.display_field, grain, path);
    }

    println!("\nMetrics:");
    for metric in registry.metrics() {
        println!(
            "  {:<16} {}({}{}.{})",
            metric.id,
            metric.function.sql_name(),
            if metric.distinct { "DISTINCT " } else { "" },
            metric.table,
            metric.column
        );
    }

    ExitCode::SUCCESS
}
