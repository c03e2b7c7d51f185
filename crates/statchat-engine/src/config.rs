//! Engine configuration.
//!
//! Loaded from YAML; every field has a default so an empty file is valid.
//!
//! ```yaml
//! query_timeout_ms: 5000
//! max_subjects: 3
//! default_rank_limit: 1
//! max_rank_limit: 10
//! players_path: data/players.yaml
//! ```

use serde::{Deserialize, Serialize};
use statchat_core::StatchatError;
use statchat_in::ParserOptions;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("player list {path}: {reason}")]
    Players { path: String, reason: String },
}

impl From<ConfigError> for StatchatError {
    fn from(err: ConfigError) -> Self {
        StatchatError::ConfigError(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deadline for each data-access call
    pub query_timeout_ms: u64,
    /// Most subjects one question may name
    pub max_subjects: usize,
    pub default_rank_limit: u32,
    pub max_rank_limit: u32,
    /// YAML or JSON list of known player display names
    pub players_path: Option<String>,
    /// Replacement statistic catalog; the embedded one when unset
    pub catalog_path: Option<String>,
    pub zero_phrases_path: Option<String>,
    pub templates_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 5000,
            max_subjects: 3,
            default_rank_limit: 1,
            max_rank_limit: 10,
            players_path: None,
            catalog_path: None,
            zero_phrases_path: None,
            templates_path: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout_ms == 0 {
            return Err(ConfigError::Invalid("query_timeout_ms must be positive".into()));
        }
        if self.max_subjects == 0 {
            return Err(ConfigError::Invalid("max_subjects must be at least 1".into()));
        }
        if self.max_rank_limit == 0 {
            return Err(ConfigError::Invalid("max_rank_limit must be at least 1".into()));
        }
        if self.default_rank_limit == 0 || self.default_rank_limit > self.max_rank_limit {
            return Err(ConfigError::Invalid(format!(
                "default_rank_limit must be between 1 and {}",
                self.max_rank_limit
            )));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            max_subjects: self.max_subjects,
            default_rank_limit: self.default_rank_limit,
            max_rank_limit: self.max_rank_limit,
        }
    }
}
