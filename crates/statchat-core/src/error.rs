//! Unified error model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatchatError {
    #[error("PARSE/{0}")]
    ParseError(String),

    #[error("REGISTRY/{0}")]
    RegistryError(String),

    #[error("QUERY/{0}")]
    QueryError(String),

    #[error("RENDER/{0}")]
    RenderError(String),

    #[error("CONFIG/{0}")]
    ConfigError(String),
}
