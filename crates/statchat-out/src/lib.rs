//! Answer synthesis for the stats chatbot.
//!
//! Turns checked statistic values into sentences:
//! - [`formatter`]: exact decimal places, labels, filter clauses
//! - [`AnswerComposer`]: lookup, comparison and ranking sentences from the
//!   Handlebars templates in `templates/answers.yaml`
//! - [`fallback`]: failure classification and polite failure messages
//! - [`quality`]: the response-shape gate
//! - [`sources`]: the values an answer cites

pub mod composer;
pub mod fallback;
pub mod formatter;
pub mod quality;
pub mod renderer;
pub mod sources;
pub mod templates;

pub use composer::{AnswerComposer, ComparedValue};
pub use fallback::{classify_parse, failure_message, FailureDetails};
pub use formatter::{effective_filters, filter_clause, format_value};
pub use renderer::AnswerRenderer;
pub use sources::{audit_query, SourceSet};
pub use templates::TemplatesFile;

use statchat_core::StatchatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template load failed: {0}")]
    Template(String),
    #[error("Render failed: {0}")]
    Render(String),
}

impl From<RenderError> for StatchatError {
    fn from(err: RenderError) -> Self {
        StatchatError::RenderError(err.to_string())
    }
}
