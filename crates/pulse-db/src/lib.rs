//! # pulse-db
//!
//! Database provisioning for the PulseChain explorer:
//! - **client** — the connection seams the provisioner is written against
//! - **postgres** — the sqlx-backed implementation of those seams
//! - **provision** — the create-if-absent + schema-load sequence

pub mod client;
pub mod postgres;
pub mod provision;

pub use client::{Connector, DbClient, QueryOutcome};
pub use postgres::{PgClient, PgConnector};
pub use provision::{setup_database, ProvisionReport};
