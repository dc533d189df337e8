//! Identifier validation.
//!
//! Postgres cannot bind identifiers as parameters, so `CREATE DATABASE` has to
//! interpolate the name. Only names that pass [`DatabaseName::parse`] ever reach
//! statement text.

use std::fmt;

use crate::error::SetupError;

/// Postgres truncates identifiers beyond `NAMEDATALEN - 1` bytes.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// A database name restricted to `[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseName(String);

impl DatabaseName {
    pub fn parse(raw: &str) -> Result<Self, SetupError> {
        let invalid = |reason: &str| SetupError::InvalidDatabaseName {
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        let Some(first) = raw.chars().next() else {
            return Err(invalid("name cannot be empty"));
        };

        if raw.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid("name is longer than 63 bytes"));
        }

        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(invalid("name must start with a letter or underscore"));
        }

        let valid = raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid {
            return Err(invalid(
                "name can only contain ASCII letters, digits, and underscores",
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for statement text.
    ///
    /// Quoting keeps case intact, so the created database matches the
    /// `pg_database.datname` value the existence check looks for.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        for name in ["pulsechain_explorer", "_scratch", "Explorer2", "a"] {
            assert!(DatabaseName::parse(name).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_injection_attempts() {
        for name in [
            "x; DROP DATABASE postgres",
            "explorer\"--",
            "explorer name",
            "explorer-db",
            "ex'plorer",
        ] {
            assert!(DatabaseName::parse(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn rejects_empty_and_leading_digit() {
        assert!(DatabaseName::parse("").is_err());
        assert!(DatabaseName::parse("1explorer").is_err());
    }

    #[test]
    fn rejects_non_ascii() {
        assert!(DatabaseName::parse("explorér").is_err());
    }

    #[test]
    fn length_limit() {
        let max = "a".repeat(MAX_IDENTIFIER_LEN);
        assert!(DatabaseName::parse(&max).is_ok());
        let too_long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(DatabaseName::parse(&too_long).is_err());
    }

    #[test]
    fn quoted_form() {
        let name = DatabaseName::parse("Explorer").unwrap();
        assert_eq!(name.quoted(), "\"Explorer\"");
        assert_eq!(name.to_string(), "Explorer");
    }
}
