//! # pulse-common
//!
//! Shared configuration, error types, and identifier validation for the
//! PulseChain explorer database tooling.

pub mod config;
pub mod error;
pub mod validation;

pub use self::config::{DatabaseConfig, SetupConfig, DEFAULT_DATABASE_NAME};
pub use error::{SetupError, SetupResult};
pub use validation::DatabaseName;
