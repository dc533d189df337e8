//! Provisioning configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > pulse-setup.toml > defaults
//!
//! Nothing here is global: the binary builds a [`SetupConfig`] once at startup
//! and passes it by reference into the provisioner.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::SetupResult;
use crate::validation::DatabaseName;

/// Database created when `DB_NAME` is unset or empty.
pub const DEFAULT_DATABASE_NAME: &str = "pulsechain_explorer";

/// Connection parameters plus the name of the database to provision.
///
/// Every field maps to a `DB_`-prefixed environment variable
/// (`DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_ADMIN_DATABASE`).
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    /// Target database, created if missing.
    pub name: String,
    /// Maintenance database used for the catalog lookup and `CREATE DATABASE`.
    pub admin_database: String,
}

impl DatabaseConfig {
    /// Load from the process environment.
    ///
    /// Call `dotenvy::dotenv()` beforehand if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(None)
    }

    /// Load from an explicit variable map instead of the process environment.
    /// `None` falls back to the real environment.
    pub fn from_source(vars: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .set_default("host", "localhost")?
            .set_default("port", 5432)?
            .set_default("user", "postgres")?
            .set_default("name", DEFAULT_DATABASE_NAME)?
            .set_default("admin_database", "postgres")?
            // Optional config file
            .add_source(config::File::with_name("pulse-setup").required(false))
            // DB_NAME, DB_HOST, ... ; an empty value counts as unset
            .add_source(
                config::Environment::with_prefix("DB")
                    .prefix_separator("_")
                    .ignore_empty(true)
                    .source(vars),
            )
            .build()?;

        cfg.try_deserialize()
    }
}

/// Everything one provisioning run needs.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub database: DatabaseConfig,
    /// Validated form of `database.name`.
    pub target: DatabaseName,
    pub schema_path: PathBuf,
}

impl SetupConfig {
    /// Validate the target name and bundle it with the schema location.
    pub fn new(database: DatabaseConfig, schema_path: impl Into<PathBuf>) -> SetupResult<Self> {
        let target = DatabaseName::parse(&database.name)?;
        Ok(Self {
            database,
            target,
            schema_path: schema_path.into(),
        })
    }
}
