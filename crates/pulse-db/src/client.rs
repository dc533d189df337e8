//! The two seams the provisioner talks through.
//!
//! [`Connector`] opens a connection to a named database; [`DbClient`] is that
//! connection. `close` takes `self`, so a client is released at most once.

/// What a `query` call reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOutcome {
    /// Number of rows returned by the statement.
    pub rows: usize,
}

#[allow(async_fn_in_trait)]
pub trait DbClient {
    /// Run one statement with positional text parameters (`$1`, `$2`, ...).
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<QueryOutcome, sqlx::Error>;

    /// Run a multi-statement script verbatim, without parameters.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), sqlx::Error>;

    /// Release the connection.
    async fn close(self) -> Result<(), sqlx::Error>;
}

#[allow(async_fn_in_trait)]
pub trait Connector {
    type Client: DbClient;

    async fn connect(&self, database: &str) -> Result<Self::Client, sqlx::Error>;
}
