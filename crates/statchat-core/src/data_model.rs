//! Data Model: ParsedQuestion, StatValue, AnswerResponse, ProcessingDetails
use crate::filters::Filters;
use crate::trace::StageTrace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What kind of answer the question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Lookup,
    Comparison,
    Ranking,
    Unclear,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDirection {
    Ascending,
    #[default]
    Descending,
}

/// Transient result of parsing one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuestion {
    pub intent: Intent,
    /// Resolved player display names, in question order
    pub subjects: Vec<String>,
    /// Names the question mentions that are not known players
    pub unresolved_subjects: Vec<String>,
    pub metric_key: Option<String>,
    pub filters: Filters,
    pub rank_limit: Option<u32>,
    pub rank_direction: RankDirection,
}

impl ParsedQuestion {
    /// A question that could not be understood at all.
    pub fn unclear() -> Self {
        Self {
            intent: Intent::Unclear,
            subjects: Vec::new(),
            unresolved_subjects: Vec::new(),
            metric_key: None,
            filters: Filters::default(),
            rank_limit: None,
            rank_direction: RankDirection::Descending,
        }
    }
}

/// Typed value for one (subject, metric, filters) tuple after shape checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum StatValue {
    Number(f64),
    Label(String),
    /// A label metric with no recorded value
    Missing,
}

impl StatValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, StatValue::Number(n) if *n == 0.0)
    }
}

/// User-facing failure taxonomy. Every failure ends as a polite sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    EmptyQuestion,
    UnclearIntent,
    PlayerNotFound,
    MetricNotRecognized,
    FilterConflict,
    DataError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::EmptyQuestion => "empty_question",
            FailureKind::UnclearIntent => "unclear_intent",
            FailureKind::PlayerNotFound => "player_not_found",
            FailureKind::MetricNotRecognized => "metric_not_recognized",
            FailureKind::FilterConflict => "filter_conflict",
            FailureKind::DataError => "data_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Lookup,
    Ranking,
    /// Follow-up appearance count used to choose a zero phrase
    AppearanceCheck,
}

/// A parameterized graph query handed to the data-access client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuery {
    pub kind: QueryKind,
    pub metric_key: String,
    pub subject: Option<String>,
    /// Filters the question asked for, after team re-keying
    pub filters: Filters,
    /// Sort order of a ranking query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<RankDirection>,
    pub cypher: String,
    /// Bound parameters; user-derived values never appear in `cypher`
    pub params: BTreeMap<String, serde_json::Value>,
}

/// One value the answer is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub subject: String,
    pub metric_key: String,
    pub value: StatValue,
}

/// Result of one response-shape check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCheck {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

/// Intermediate resolutions, exposed for introspection and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBreakdown {
    pub resolved_subjects: Vec<String>,
    pub unresolved_subjects: Vec<String>,
    /// True when the subject came from the caller's userContext
    pub defaulted_subject: bool,
    pub matched_alias: Option<String>,
    pub metric: Option<String>,
    pub effective_filters: Filters,
    pub failure: Option<FailureKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingDetails {
    pub trace_id: String,
    pub answered_at: DateTime<Utc>,
    pub question_analysis: ParsedQuestion,
    pub cypher_queries: Vec<GeneratedQuery>,
    pub query_breakdown: QueryBreakdown,
    pub trace: Vec<StageTrace>,
    pub shape_checks: Vec<ShapeCheck>,
}

/// The response for one call. Built fresh and never mutated after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    /// Generated queries joined for audit; empty when nothing was queried
    pub cypher_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_details: Option<ProcessingDetails>,
}

impl AnswerResponse {
    /// Drop the introspection payload, e.g. before returning to end users.
    pub fn without_details(mut self) -> Self {
        self.processing_details = None;
        self
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.processing_details
            .as_ref()
            .and_then(|d| d.query_breakdown.failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_value_zero() {
        assert!(StatValue::Number(0.0).is_zero());
        assert!(!StatValue::Number(0.5).is_zero());
        assert!(!StatValue::Missing.is_zero());
        assert_eq!(StatValue::Label("3rd XI".into()).as_number(), None);
    }

    #[test]
    fn test_answer_wire_format() {
        let response = AnswerResponse {
            answer: "Luke Bangs has scored 3 goals.".to_string(),
            sources: Vec::new(),
            cypher_query: String::new(),
            processing_details: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("cypherQuery").is_some());
        assert!(json.get("processingDetails").is_none());
    }
}
