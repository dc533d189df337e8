//! PostgreSQL connection helpers.
//!
//! Provisioning opens one connection at a time rather than a pool.

use pulse_common::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use crate::client::{Connector, DbClient, QueryOutcome};

/// Opens connections to any database on the configured server.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .application_name("pulse-setup");

        if let Some(password) = &config.password {
            options = options.password(password);
        }

        Self { options }
    }
}

impl Connector for PgConnector {
    type Client = PgClient;

    async fn connect(&self, database: &str) -> Result<PgClient, sqlx::Error> {
        tracing::debug!(database, "Connecting to PostgreSQL...");
        let options = self.options.clone().database(database);
        let conn = PgConnection::connect_with(&options).await?;
        tracing::debug!(database, "Connected to PostgreSQL");
        Ok(PgClient { conn })
    }
}

/// A single live connection.
pub struct PgClient {
    conn: PgConnection,
}

impl DbClient for PgClient {
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<QueryOutcome, sqlx::Error> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(&mut self.conn).await?;
        Ok(QueryOutcome { rows: rows.len() })
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        // Simple query protocol: the text may hold any number of statements.
        sqlx::raw_sql(sql).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}
