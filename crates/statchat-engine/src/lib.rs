//! Question-to-answer engine for the stats chatbot.
//!
//! Wires the parser, the query layer and the answer composer into one
//! infallible call: [`ChatbotEngine::process_question`].
//!
//! # Example
//!
//! ```ignore
//! use statchat_engine::{ChatbotEngine, EngineConfig};
//! use statchat_query::MemoryStatsClient;
//!
//! let client = Arc::new(MemoryStatsClient::new().with_value("Luke Bangs", "G", 12.0));
//! let engine = ChatbotEngine::new(EngineConfig::default(), directory, client)?;
//! let response = engine
//!     .process_question(&QuestionContext::new("How many goals has Luke Bangs scored?", ""))
//!     .await;
//! assert_eq!(response.answer, "Luke Bangs has scored 12 goals.");
//! ```

pub mod config;
pub mod diagnostics;
pub mod directory;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use diagnostics::DiagnosticsSink;
pub use directory::{load_directory, parse_directory};
pub use service::{ChatbotEngine, APPEARANCES_KEY};

use statchat_core::StatchatError;
use thiserror::Error;

/// Startup failures. Once built, the engine answers every question.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog: {0}")]
    Registry(#[from] statchat_registry::RegistryError),
    #[error("templates: {0}")]
    Render(#[from] statchat_out::RenderError),
    #[error("players: {0}")]
    Parse(#[from] statchat_in::ParseError),
}

impl From<EngineError> for StatchatError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Config(e) => e.into(),
            EngineError::Registry(e) => e.into(),
            EngineError::Render(e) => e.into(),
            EngineError::Parse(e) => e.into(),
        }
    }
}
