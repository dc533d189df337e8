//! # pulse-setup
//!
//! One-shot provisioning binary for the PulseChain explorer:
//! - creates the explorer database if it does not exist yet
//! - applies `sql/create.tables.sql` to it
//!
//! Exits 0 on success and 1 on any failure.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pulse_common::config::{DatabaseConfig, SetupConfig};
use pulse_common::error::SetupError;
use pulse_db::{setup_database, PgConnector, ProvisionReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Schema location relative to the directory holding the binary.
const SCHEMA_RELATIVE_PATH: &str = "sql/create.tables.sql";

/// Fallback for `cargo run`, where the binary sits in `target/` away from `sql/`.
const SOURCE_TREE_SCHEMA_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/sql/create.tables.sql");

/// Default filter when `RUST_LOG` is unset; `pulse` covers every `pulse_*` crate.
const DEFAULT_LOG_FILTER: &str = "pulse=info,sqlx=warn";

const RULE: &str = "═══════════════════════════════════════════════════════════";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pulse-setup", version)]
#[command(about = "Create the PulseChain explorer database and apply its table schema")]
struct Args {
    /// Database to provision (overrides DB_NAME)
    #[arg(long)]
    database_name: Option<String>,

    /// SQL file executed against the database
    /// [default: sql/create.tables.sql next to the executable]
    #[arg(long, env = "SCHEMA_PATH")]
    schema: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_format);

    tracing::info!("{RULE}");
    tracing::info!("           PulseChain Explorer - Database Setup");
    tracing::info!("{RULE}");

    match run(args).await {
        Ok(report) => {
            tracing::info!(
                database = %report.database,
                created = report.created,
                schema = %report.schema_path.display(),
                schema_bytes = report.schema_bytes,
                "🎉 Database setup complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e
                .downcast_ref::<SetupError>()
                .map(SetupError::error_code)
                .unwrap_or("INTERNAL_ERROR");
            tracing::error!(code, "setup failed");
            eprintln!("❌ Setup failed: {e:#}");
            eprintln!("{e:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ProvisionReport> {
    let database = resolve_database_config(DatabaseConfig::from_env(), args.database_name)?;
    let schema_path = args.schema.unwrap_or_else(default_schema_path);
    let config = SetupConfig::new(database, schema_path)?;

    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        user = %config.database.user,
        database = %config.target,
        "Provisioning PostgreSQL database"
    );

    let connector = PgConnector::new(&config.database);
    let report = setup_database(&config, &connector)
        .await
        .with_context(|| format!("provisioning database '{}' failed", config.target))?;

    Ok(report)
}

/// Apply the CLI override on top of the loaded configuration.
fn resolve_database_config(
    loaded: Result<DatabaseConfig, config::ConfigError>,
    name_override: Option<String>,
) -> Result<DatabaseConfig, SetupError> {
    let mut database = loaded?;
    if let Some(name) = name_override.filter(|n| !n.is_empty()) {
        database.name = name;
    }
    Ok(database)
}

/// `sql/create.tables.sql` beside the running executable, or the copy in the
/// source tree when no schema was installed next to it.
fn default_schema_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    schema_path_beside(exe_dir.as_deref())
}

fn schema_path_beside(exe_dir: Option<&Path>) -> PathBuf {
    match exe_dir.map(|dir| dir.join(SCHEMA_RELATIVE_PATH)) {
        Some(installed) if installed.is_file() => installed,
        _ => PathBuf::from(SOURCE_TREE_SCHEMA_PATH),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match format {
        LogFormat::Text => builder.without_time().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn loaded(pairs: &[(&str, &str)]) -> Result<DatabaseConfig, config::ConfigError> {
        DatabaseConfig::from_source(Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn explicit_schema_flag_is_used() {
        let args = Args::try_parse_from(["pulse-setup", "--schema", "/tmp/schema.sql"]).unwrap();
        assert_eq!(args.schema, Some(PathBuf::from("/tmp/schema.sql")));
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn schema_next_to_executable_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sql")).unwrap();
        std::fs::write(dir.path().join(SCHEMA_RELATIVE_PATH), "SELECT 1;").unwrap();

        let resolved = schema_path_beside(Some(dir.path()));
        assert_eq!(resolved, dir.path().join("sql").join("create.tables.sql"));
    }

    #[test]
    fn source_tree_schema_when_nothing_is_installed() {
        let dir = tempfile::tempdir().unwrap();

        let resolved = schema_path_beside(Some(dir.path()));
        assert_eq!(resolved, PathBuf::from(SOURCE_TREE_SCHEMA_PATH));
        assert!(resolved.exists());
        assert_eq!(schema_path_beside(None), resolved);
    }

    #[test]
    fn default_log_filter_covers_all_crates() {
        assert_eq!(DEFAULT_LOG_FILTER, "pulse=info,sqlx=warn");
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn flag_overrides_db_name() {
        let db = resolve_database_config(
            loaded(&[("DB_NAME", "from_env")]),
            Some("from_flag".into()),
        )
        .unwrap();
        assert_eq!(db.name, "from_flag");
    }

    #[test]
    fn empty_flag_keeps_configured_name() {
        let db = resolve_database_config(loaded(&[]), Some(String::new())).unwrap();
        assert_eq!(db.name, "pulsechain_explorer");
    }

    #[test]
    fn config_errors_surface_as_setup_errors() {
        let err = resolve_database_config(loaded(&[("DB_PORT", "nope")]), None).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
