//! Statchat Core: data model, failure taxonomy and stage tracing.
//!
//! Every other crate in the workspace speaks in these types: the parser
//! produces a [`ParsedQuestion`], the query layer fills [`StatValue`]s and
//! the engine hands back an [`AnswerResponse`] carrying its own
//! [`ProcessingDetails`].

pub mod context;
pub mod data_model;
pub mod error;
pub mod filters;
pub mod trace;

pub use context::QuestionContext;
pub use data_model::{
    AnswerResponse, FailureKind, GeneratedQuery, Intent, ParsedQuestion, ProcessingDetails,
    QueryBreakdown, QueryKind, RankDirection, ShapeCheck, Source, StatValue,
};
pub use error::StatchatError;
pub use filters::{FilterKind, Filters, Position, Season, TeamCode};
pub use trace::{StageTimer, StageTrace, TraceRecorder};

/// Engine version reported by the API health endpoint.
pub const STATCHAT_VERSION: &str = "1.0.0";
