//! Error types for the query cache.
//!
//! Staleness of a cached statement is never an error: it is healed inside the
//! statement cache. Everything in this module is surfaced to the caller.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which executor path produced a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Count,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Count => "COUNT",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the query cache.
#[derive(Debug, Error)]
pub enum QueryCacheError {
    // Setup errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown database: {name}")]
    UnknownDatabase { name: String },

    #[error("Unknown table: {table}")]
    UnknownTable { table: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Query building errors
    #[error(
        "Cannot create a COUNT query when using HAVING and duplicate column names in the SELECT part"
    )]
    AliasingConflict,

    // Execution errors
    #[error("Unable to execute {kind} statement [{sql}]")]
    StatementExecution {
        kind: StatementKind,
        sql: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // Backend storage errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for query cache operations.
pub type Result<T> = std::result::Result<T, QueryCacheError>;

impl From<std::io::Error> for QueryCacheError {
    fn from(err: std::io::Error) -> Self {
        QueryCacheError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for QueryCacheError {
    fn from(err: serde_json::Error) -> Self {
        QueryCacheError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for QueryCacheError {
    fn from(err: rusqlite::Error) -> Self {
        QueryCacheError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl QueryCacheError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        QueryCacheError::Config {
            message: message.into(),
        }
    }

    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        QueryCacheError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// True when the error points at missing or invalid setup rather than a
    /// failure of a particular query.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QueryCacheError::Config { .. }
                | QueryCacheError::UnknownDatabase { .. }
                | QueryCacheError::Validation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryCacheError::UnknownTable {
            table: "book".into(),
        };
        assert_eq!(err.to_string(), "Unknown table: book");
    }

    #[test]
    fn test_statement_error_keeps_sql_and_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = QueryCacheError::StatementExecution {
            kind: StatementKind::Count,
            sql: "SELECT COUNT(*) FROM book".into(),
            source: Box::new(cause),
        };

        assert_eq!(
            err.to_string(),
            "Unable to execute COUNT statement [SELECT COUNT(*) FROM book]"
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "disk on fire");
    }

    #[test]
    fn test_configuration_errors() {
        assert!(QueryCacheError::config("missing backend").is_configuration_error());
        assert!(!QueryCacheError::AliasingConflict.is_configuration_error());
    }
}
