use statchat_core::{StatchatError, TeamCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("stat '{key}' is missing '{field}'")]
    MissingField { key: String, field: &'static str },

    #[error("stat '{key}' has an invalid {field}: {reason}")]
    Invalid {
        key: String,
        field: &'static str,
        reason: String,
    },

    #[error("stat '{key}' refers to unknown base '{base}'")]
    UnknownBase { key: String, base: String },

    #[error("more than one stat specialises '{base}' for team {team}")]
    DuplicateSpecialisation { base: String, team: TeamCode },

    #[error("pattern '{pattern}' of '{owner}' does not compile: {source}")]
    InvalidPattern {
        owner: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("expected {expected} stats, found {found}")]
    CountMismatch { expected: usize, found: usize },

    #[error("no zero phrase rule covers stat '{0}'")]
    MissingZeroRule(String),

    #[error("zero phrase rule '{rule}' names unknown stat '{key}'")]
    UnknownZeroKey { rule: String, key: String },
}

impl From<RegistryError> for StatchatError {
    fn from(err: RegistryError) -> Self {
        StatchatError::RegistryError(err.to_string())
    }
}
