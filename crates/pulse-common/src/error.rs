//! Error types for a provisioning run.
//!
//! Every variant is fatal for the run; the variants exist so callers and logs
//! can tell a refused connection apart from a broken schema file.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Configuration error")]
    Config(#[from] config::ConfigError),

    #[error("Invalid database name '{name}': {reason}")]
    InvalidDatabaseName { name: String, reason: String },

    #[error("Could not connect to database '{database}'")]
    Connection {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Catalog lookup for database '{database}' failed")]
    CatalogLookup {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Could not create database '{database}'")]
    CreateDatabase {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Could not read schema file {}", path.display())]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema execution against '{database}' failed")]
    SchemaExecution {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Could not close connection to '{database}'")]
    Close {
        database: String,
        #[source]
        source: sqlx::Error,
    },
}

impl SetupError {
    /// Stable code for structured logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidDatabaseName { .. } => "INVALID_DATABASE_NAME",
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::CatalogLookup { .. } => "CATALOG_LOOKUP_ERROR",
            Self::CreateDatabase { .. } => "CREATE_DATABASE_ERROR",
            Self::SchemaFile { .. } => "SCHEMA_FILE_ERROR",
            Self::SchemaExecution { .. } => "SCHEMA_EXECUTION_ERROR",
            Self::Close { .. } => "CLOSE_ERROR",
        }
    }
}

/// Convenience type alias for Results using SetupError.
pub type SetupResult<T> = Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_file_error_names_the_path() {
        let err = SetupError::SchemaFile {
            path: PathBuf::from("sql/create.tables.sql"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("sql/create.tables.sql"));
        assert_eq!(err.error_code(), "SCHEMA_FILE_ERROR");
    }

    #[test]
    fn cause_is_left_to_the_source_chain() {
        let err = SetupError::SchemaFile {
            path: PathBuf::from("/nonexistent"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(err.to_string(), "Could not read schema file /nonexistent");

        let source = std::error::Error::source(&err).expect("io error kept as source");
        assert_eq!(source.to_string(), "No such file");
    }

    #[test]
    fn source_chain_is_preserved() {
        let err = SetupError::Connection {
            database: "postgres".into(),
            source: sqlx::Error::PoolTimedOut,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.error_code(), "CONNECTION_ERROR");
    }
}
