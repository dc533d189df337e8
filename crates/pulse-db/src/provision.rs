//! Database provisioning: make sure the target database exists, then apply
//! the table schema to it.
//!
//! A run is strictly sequential:
//! catalog lookup → optional `CREATE DATABASE` → connect to target → read
//! schema → execute schema.
//! Each connection is closed on every path before the run returns. Nothing is
//! rolled back; a database created before a failing schema load stays.

use std::path::{Path, PathBuf};

use pulse_common::config::SetupConfig;
use pulse_common::error::{SetupError, SetupResult};
use pulse_common::validation::DatabaseName;

use crate::client::{Connector, DbClient};

const CATALOG_LOOKUP: &str = "SELECT 1 FROM pg_database WHERE datname = $1";

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub database: DatabaseName,
    /// `true` if this run issued the `CREATE DATABASE`.
    pub created: bool,
    pub schema_path: PathBuf,
    pub schema_bytes: usize,
}

/// Run the whole provisioning sequence.
pub async fn setup_database<C: Connector>(
    config: &SetupConfig,
    connector: &C,
) -> SetupResult<ProvisionReport> {
    let target = &config.target;

    let created = ensure_database(connector, &config.database.admin_database, target).await?;

    let schema_bytes = apply_schema(connector, target, &config.schema_path).await?;
    tracing::info!("✅ SQL completed successfully!");

    Ok(ProvisionReport {
        database: target.clone(),
        created,
        schema_path: config.schema_path.clone(),
        schema_bytes,
    })
}

/// Create `target` through the maintenance database unless it already exists.
///
/// Returns whether a database was created.
pub async fn ensure_database<C: Connector>(
    connector: &C,
    admin_database: &str,
    target: &DatabaseName,
) -> SetupResult<bool> {
    let mut client = connect(connector, admin_database).await?;
    let outcome = create_if_absent(&mut client, target).await;
    release(client, admin_database, outcome).await
}

async fn create_if_absent<D: DbClient>(client: &mut D, target: &DatabaseName) -> SetupResult<bool> {
    let lookup = client
        .query(CATALOG_LOOKUP, &[target.as_str()])
        .await
        .map_err(|source| SetupError::CatalogLookup {
            database: target.to_string(),
            source,
        })?;

    if lookup.rows > 0 {
        tracing::info!("✅ Database \"{target}\" already exists.");
        return Ok(false);
    }

    tracing::info!("📦 Database \"{target}\" does not exist. Creating...");
    client
        .query(&create_statement(target), &[])
        .await
        .map_err(|source| SetupError::CreateDatabase {
            database: target.to_string(),
            source,
        })?;
    tracing::info!("✅ Database \"{target}\" created successfully!");

    Ok(true)
}

/// `CREATE DATABASE` text for an already-validated name.
pub fn create_statement(target: &DatabaseName) -> String {
    format!("CREATE DATABASE {}", target.quoted())
}

/// Read the schema file verbatim. The SQL is not inspected.
pub fn load_schema(path: &Path) -> SetupResult<String> {
    std::fs::read_to_string(path).map_err(|source| SetupError::SchemaFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Open a connection to `target`, then read the schema file and execute it
/// as one batch. The file is only read once the connection is up.
///
/// Returns the schema size in bytes.
pub async fn apply_schema<C: Connector>(
    connector: &C,
    target: &DatabaseName,
    schema_path: &Path,
) -> SetupResult<usize> {
    let mut client = connect(connector, target.as_str()).await?;
    let outcome = run_schema(&mut client, target, schema_path).await;
    release(client, target.as_str(), outcome).await
}

async fn run_schema<D: DbClient>(
    client: &mut D,
    target: &DatabaseName,
    schema_path: &Path,
) -> SetupResult<usize> {
    let schema = load_schema(schema_path)?;
    tracing::info!("📄 Running sql file: {}", display_name(schema_path));

    client
        .execute_batch(&schema)
        .await
        .map_err(|source| SetupError::SchemaExecution {
            database: target.to_string(),
            source,
        })?;

    Ok(schema.len())
}

async fn connect<C: Connector>(connector: &C, database: &str) -> SetupResult<C::Client> {
    connector
        .connect(database)
        .await
        .map_err(|source| SetupError::Connection {
            database: database.to_string(),
            source,
        })
}

/// Close `client` and fold the close result into `outcome`.
/// An earlier failure wins over a failed close.
async fn release<D: DbClient, T>(
    client: D,
    database: &str,
    outcome: SetupResult<T>,
) -> SetupResult<T> {
    match (outcome, client.close().await) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(source)) => Err(SetupError::Close {
            database: database.to_string(),
            source,
        }),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!(database, error = %close_err, "Failed to close connection after error");
            Err(e)
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
