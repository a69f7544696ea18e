//! cubeplan CLI - plan analytics queries into partitioned sub-queries
//!
//! Usage:
//!   cubeplan plan <query.json> [--mode aggregate|event|enrollment] [--dialect <dialect>]
//!   cubeplan config
//!
//! Examples:
//!   cubeplan plan requests/anc_visits.json
//!   cubeplan plan requests/cohort.json --mode enrollment --dialect duckdb
//!   RUST_LOG=cubeplan=debug cubeplan plan requests/anc_visits.json

use clap::{Parser, Subcommand, ValueEnum};
use cubeplan::config::Settings;
use cubeplan::partition::{CachedPartitionProbe, PartitionProbe, SqlitePartitionProbe};
use cubeplan::planner::QueryPlanner;
use cubeplan::query::AnalyticsQuery;
use cubeplan::sql::{Dialect, EnrollmentTimeFieldSqlRenderer, EventTimeFieldSqlRenderer, TimeFieldSqlRenderer};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "cubeplan")]
#[command(about = "cubeplan - plan dimensional analytics queries into partitioned SQL")]
#[command(version)]
struct Cli {
    /// Config file (overrides CUBEPLAN_CONFIG and the default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a JSON analytics query and print its sub-queries
    Plan {
        /// Path to the query JSON file
        file: PathBuf,

        /// Planning mode
        #[arg(short, long, default_value = "aggregate")]
        mode: Mode,

        /// SQL dialect (defaults to the configured one)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Print the effective settings as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Aggregate,
    Event,
    Enrollment,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

fn main() -> ExitCode {
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

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.logging.level.to_lowercase())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan { file, mode, dialect } => {
            let dialect = dialect.map(Dialect::from).unwrap_or(settings.sql.dialect);
            cmd_plan(&settings, file, mode, dialect)
        }
        Commands::Config => cmd_config(&settings),
    }
}

fn cmd_plan(settings: &Settings, file: PathBuf, mode: Mode, dialect: Dialect) -> ExitCode {
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let query: AnalyticsQuery = match serde_json::from_str(&source) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Invalid query '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let probe = match open_probe(settings) {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("Error opening partition catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let planner = match &probe {
        Some(probe) => QueryPlanner::with_probe(probe as &dyn PartitionProbe),
        None => QueryPlanner::new(),
    };

    let planned = match mode {
        Mode::Aggregate => planner.plan_aggregate_query(&query),
        Mode::Event => planner.plan_event_query(&query).map(|q| vec![q]),
        Mode::Enrollment => planner.plan_enrollment_query(&query).map(|q| vec![q]),
    };
    let planned = match planned {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            eprintln!("Planning error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let renderer: Box<dyn TimeFieldSqlRenderer> = match mode {
        Mode::Enrollment => Box::new(EnrollmentTimeFieldSqlRenderer::new(dialect)),
        _ => Box::new(EventTimeFieldSqlRenderer::new(dialect)),
    };

    let mut sub_queries = Vec::with_capacity(planned.len());
    for query in &planned {
        let descriptor = match query.descriptor() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Planning error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        let time_sql = match renderer.render_period_time_field_sql(query) {
            Ok(sql) => sql,
            Err(e) => {
                eprintln!("Rendering error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        debug!(table = %descriptor.table_name, "Rendered sub-query");
        sub_queries.push(json!({
            "descriptor": descriptor,
            "periodColumn": query.period_column(),
            "orgUnitColumn": query.org_unit_column(),
            "aggregationType": query.aggregation_type(),
            "timeFieldSql": time_sql,
        }));
    }

    match serde_json::to_string_pretty(&json!({ "dialect": dialect.to_string(), "subQueries": sub_queries })) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_probe(
    settings: &Settings,
) -> Result<Option<CachedPartitionProbe<SqlitePartitionProbe>>, Box<dyn std::error::Error>> {
    if !settings.probe_partitions() {
        return Ok(None);
    }
    let Some(path) = settings.partitions.resolved_catalog()? else {
        return Ok(None);
    };
    let probe = SqlitePartitionProbe::open(&path)?;
    Ok(Some(CachedPartitionProbe::new(probe)))
}

fn cmd_config(settings: &Settings) -> ExitCode {
    match toml::to_string_pretty(settings) {
        Ok(out) => {
            print!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing settings: {}", e);
            ExitCode::FAILURE
        }
    }
}
