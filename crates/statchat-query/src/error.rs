//! Query construction, execution and result errors.

use statchat_core::{FailureKind, FilterKind, StatchatError};
use std::time::Duration;

/// Errors raised by a data-access client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("database error {code}: {message}")]
    Database { code: String, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("connection failed: {0}")]
    Connection(String),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("metric '{key}' cannot be filtered by {}", join_kinds(.kinds))]
    FilterConflict { key: String, kinds: Vec<FilterKind> },

    #[error("metric '{0}' is a label and cannot be compared or ranked")]
    NotOrderable(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("metric '{key}' expected a {expected} value, got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("metric '{key}' returned negative value {value}")]
    NegativeValue { key: String, value: f64 },
}

impl QueryError {
    /// The user-facing failure this error is reported as.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            QueryError::FilterConflict { .. } | QueryError::NotOrderable(_) => {
                FailureKind::FilterConflict
            }
            _ => FailureKind::DataError,
        }
    }
}

fn join_kinds(kinds: &[FilterKind]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<QueryError> for StatchatError {
    fn from(err: QueryError) -> Self {
        StatchatError::QueryError(err.to_string())
    }
}
