mod config;
mod registry;
mod store;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

use seedbed_core::{
    DatabaseSchema, DependencyReport, Error as CoreError, MissingDependencyPolicy, RulesConfig,
    dependency_report, redact_connection_string, validate_schema,
};
use seedbed_generate::{
    GenerationError, GeneratorRegistry, InMemoryStore, PopulateOptions, PopulationEngine,
    PopulationReport, RandomSource, apply_rules, plan_tables,
};
use seedbed_introspect::{Adapter, IntrospectOptions, PostgresAdapter};

use config::{ConfigError, load_rules};
use registry::{RunContext, RunOptions, init_logging, start_run, write_report, write_schema};
use store::PgRowStore;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "seedbed", version, about = "Fill relational databases with fake rows")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate rows for every table of a namespace.
    Generate(GenerateArgs),
    /// Print the discovered schema and its dependency order as JSON.
    Inspect(InspectArgs),
    /// Print the JSON Schema of the rules file.
    RulesSchema,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// Database connection string (flag form).
    #[arg(long, value_name = "CONNECTION_STRING", conflicts_with = "conn_pos")]
    conn: Option<String>,
    /// Database connection string (positional form).
    #[arg(value_name = "CONNECTION_STRING", required_unless_present = "conn")]
    conn_pos: Option<String>,
    /// Namespace (schema) to work in.
    #[arg(long, default_value = "public")]
    schema: String,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Rules file (YAML, TOML or JSON).
    #[arg(long, default_value = "gen_settings.yaml")]
    rules: PathBuf,
    /// Seed for reproducible output; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Generate into memory and export CSV files instead of inserting.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Fail when a table depends on a table outside the namespace.
    #[arg(long, default_value_t = false)]
    strict_dependencies: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    connection: ConnectionArgs,
    /// Write the JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct InspectOutput<'a> {
    schema: &'a DatabaseSchema,
    dependencies: DependencyReport,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Inspect(args) => run_inspect(args).await,
        Command::RulesSchema => print_rules_schema(),
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        connection,
        rules,
        seed,
        run_dir,
        dry_run,
        strict_dependencies,
    } = args;

    let conn = connection_string(connection.conn, connection.conn_pos)?;
    let engine = detect_engine(&conn)?;
    let rules_config = load_rules(&rules)?;

    let rng = match seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        engine: engine.to_string(),
        run_dir,
        options: RunOptions {
            namespace: connection.schema.clone(),
            rules_path: rules.clone(),
            seed: rng.seed(),
            dry_run,
            strict_dependencies,
        },
        connection: redact_connection_string(&conn),
    };

    let run_paths = start_run(&run_ctx)?;
    init_logging(Some(&run_paths.logs_path))?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        engine = %engine,
        seed = rng.seed(),
        dry_run,
        run_path = %run_paths.root.display()
    );
    tracing::info!(
        event = "rules_loaded",
        path = %rules.display(),
        tables = rules_config.rules.len()
    );

    let timer = Instant::now();
    let pool = connect(&conn).await?;
    let schema = discover(&pool, &connection.schema).await?;
    write_schema(&run_paths, &schema)?;

    let report = populate(
        &pool,
        &schema,
        &rules_config,
        rng,
        strict_dependencies,
        dry_run.then_some(run_paths.data_dir.as_path()),
    )
    .await?;

    write_report(&run_paths, &report)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    for table in report.aborted_tables() {
        tracing::warn!(
            table = %table.table,
            rows_inserted = table.rows_inserted,
            rows_requested = table.rows_requested,
            "table population aborted"
        );
    }

    tracing::info!(
        event = "run_finished",
        status = "success",
        rows_inserted = report.rows_inserted(),
        rows_failed = report.rows_failed(),
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(())
}

/// Plan tables, apply rules and run the engine against the chosen store.
///
/// With `dry_run_dir` set, rows stay in memory and are exported as CSV.
async fn populate(
    pool: &PgPool,
    schema: &DatabaseSchema,
    rules: &RulesConfig,
    rng: RandomSource,
    strict_dependencies: bool,
    dry_run_dir: Option<&std::path::Path>,
) -> Result<PopulationReport, CliError> {
    let registry = GeneratorRegistry::new(rng.clone());
    let mut tables = plan_tables(schema, &registry);
    apply_rules(&mut tables, rules, &registry)?;

    let engine = PopulationEngine::new(PopulateOptions {
        missing_dependencies: if strict_dependencies {
            MissingDependencyPolicy::Fail
        } else {
            MissingDependencyPolicy::Skip
        },
    });

    match dry_run_dir {
        Some(dir) => {
            let mut store = InMemoryStore::for_tables(&tables, rng);
            let report = engine.run(&mut store, tables).await?;
            let files = store.write_csv(dir)?;
            tracing::info!(event = "dry_run_exported", files = files.len(), dir = %dir.display());
            Ok(report)
        }
        None => {
            let mut store = PgRowStore::new(pool.clone(), schema.namespace.clone());
            Ok(engine.run(&mut store, tables).await?)
        }
    }
}

async fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let InspectArgs { connection, out } = args;
    let conn = connection_string(connection.conn, connection.conn_pos)?;
    let engine = detect_engine(&conn)?;

    init_logging(None)?;
    tracing::info!(event = "engine_detected", engine = %engine);

    let pool = connect(&conn).await?;
    let schema = discover(&pool, &connection.schema).await?;
    let output = InspectOutput {
        dependencies: dependency_report(&schema.tables),
        schema: &schema,
    };

    match out {
        Some(path) => {
            registry::write_json(&path, &output)?;
            tracing::info!(event = "inspect_written", path = %path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&output)
                .map_err(registry::RegistryError::from)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn print_rules_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(RulesConfig);
    let json = serde_json::to_string_pretty(&schema).map_err(registry::RegistryError::from)?;
    println!("{json}");
    Ok(())
}

async fn connect(conn: &str) -> Result<PgPool, CliError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    Ok(pool)
}

async fn discover(pool: &PgPool, namespace: &str) -> Result<DatabaseSchema, CliError> {
    let adapter = PostgresAdapter::new(pool.clone());
    tracing::info!(
        event = "introspection_started",
        engine = adapter.engine(),
        namespace = %namespace
    );
    let schema = adapter
        .introspect(&IntrospectOptions::for_namespace(namespace))
        .await?;
    validate_schema(&schema)?;
    tracing::info!(event = "introspection_finished", tables = schema.tables.len());
    Ok(schema)
}

fn connection_string(flag: Option<String>, positional: Option<String>) -> Result<String, CliError> {
    match (flag, positional) {
        (Some(value), None) | (None, Some(value)) => Ok(value),
        (Some(_), Some(_)) => Err(CliError::InvalidConfig(
            "use either --conn or positional connection string".to_string(),
        )),
        (None, None) => Err(CliError::InvalidConfig(
            "connection string is required".to_string(),
        )),
    }
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}
