//! Failure classification and the user-facing failure messages.
//!
//! Every failure ends as one polite sentence. Nothing operator-facing
//! (query text, error detail) is passed to these templates.

use crate::renderer::AnswerRenderer;
use crate::RenderError;
use serde_json::json;
use statchat_core::{FailureKind, FilterKind, Intent, ParsedQuestion};

/// Metrics suggested when none was recognised
const EXAMPLE_METRICS: &[&str] = &[
    "goals",
    "assists",
    "appearances",
    "clean sheets",
    "minutes played",
];

const EXAMPLE_PLAYER: &str = "a player";

/// What a failure message may mention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureDetails {
    /// Player names that could not be found, as the user wrote them
    pub unresolved: Vec<String>,
    /// Metric display name
    pub metric: Option<String>,
    /// Filters the metric cannot take; empty when it cannot be ordered
    pub filter_kinds: Vec<FilterKind>,
}

/// Decide whether a parse can be answered. `empty` means the question had
/// no usable text. Comparisons with one resolved subject are answerable.
pub fn classify_parse(parsed: &ParsedQuestion, empty: bool) -> Option<FailureKind> {
    if empty {
        return Some(FailureKind::EmptyQuestion);
    }
    let names_anyone = !parsed.subjects.is_empty() || !parsed.unresolved_subjects.is_empty();
    match parsed.intent {
        Intent::Unclear if parsed.metric_key.is_none() && names_anyone => {
            Some(FailureKind::MetricNotRecognized)
        }
        Intent::Unclear => Some(FailureKind::UnclearIntent),
        _ if parsed.metric_key.is_none() => Some(FailureKind::MetricNotRecognized),
        Intent::Ranking => None,
        Intent::Lookup | Intent::Comparison if parsed.subjects.is_empty() => {
            Some(FailureKind::PlayerNotFound)
        }
        Intent::Lookup | Intent::Comparison => None,
    }
}

pub fn failure_message(
    renderer: &AnswerRenderer,
    kind: FailureKind,
    details: &FailureDetails,
) -> Result<String, RenderError> {
    let data = match kind {
        FailureKind::EmptyQuestion | FailureKind::DataError => json!({}),
        FailureKind::UnclearIntent => json!({ "example_player": EXAMPLE_PLAYER }),
        FailureKind::PlayerNotFound => json!({ "names": details.unresolved }),
        FailureKind::MetricNotRecognized => json!({ "examples": EXAMPLE_METRICS }),
        FailureKind::FilterConflict => {
            let kinds: Vec<String> = details.filter_kinds.iter().map(|k| k.to_string()).collect();
            json!({
                "metric": details.metric.as_deref().unwrap_or("that statistic"),
                "kinds": kinds,
            })
        }
    };
    renderer.render(kind.as_str(), &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statchat_core::RankDirection;

    fn parsed(intent: Intent, subjects: &[&str], unresolved: &[&str], metric: Option<&str>) -> ParsedQuestion {
        ParsedQuestion {
            intent,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            unresolved_subjects: unresolved.iter().map(|s| s.to_string()).collect(),
            metric_key: metric.map(String::from),
            filters: Default::default(),
            rank_limit: None,
            rank_direction: RankDirection::Descending,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_parse(&ParsedQuestion::unclear(), true),
            Some(FailureKind::EmptyQuestion)
        );
        assert_eq!(
            classify_parse(&parsed(Intent::Unclear, &[], &[], None), false),
            Some(FailureKind::UnclearIntent)
        );
        assert_eq!(
            classify_parse(&parsed(Intent::Unclear, &["Luke Bangs"], &[], None), false),
            Some(FailureKind::MetricNotRecognized)
        );
        assert_eq!(
            classify_parse(&parsed(Intent::Lookup, &[], &["John Smith"], Some("G")), false),
            Some(FailureKind::PlayerNotFound)
        );
        assert_eq!(
            classify_parse(&parsed(Intent::Comparison, &["Luke Bangs"], &["John Smith"], Some("G")), false),
            None
        );
        assert_eq!(classify_parse(&parsed(Intent::Ranking, &[], &[], Some("G")), false), None);
        assert_eq!(
            classify_parse(&parsed(Intent::Ranking, &[], &[], None), false),
            Some(FailureKind::MetricNotRecognized)
        );
    }

    #[test]
    fn test_messages_are_polite_sentences() {
        let renderer = AnswerRenderer::builtin().unwrap();
        let details = FailureDetails {
            unresolved: vec!["John Smith".into()],
            metric: Some("3rd XI goals".into()),
            filter_kinds: vec![FilterKind::Team],
        };
        for kind in [
            FailureKind::EmptyQuestion,
            FailureKind::UnclearIntent,
            FailureKind::PlayerNotFound,
            FailureKind::MetricNotRecognized,
            FailureKind::FilterConflict,
            FailureKind::DataError,
        ] {
            let text = failure_message(&renderer, kind, &details).unwrap();
            assert!(text.chars().next().unwrap().is_uppercase(), "{}", text);
            assert!(text.ends_with(['.', '?', '!', '"']), "{}", text);
        }
        let text = failure_message(&renderer, FailureKind::PlayerNotFound, &details).unwrap();
        assert!(text.contains("couldn't find a player called John Smith"));
        let text = failure_message(&renderer, FailureKind::FilterConflict, &details).unwrap();
        assert_eq!(text, "Sorry, I can't break 3rd XI goals down by team.");
    }

    #[test]
    fn test_player_not_found_without_names() {
        let renderer = AnswerRenderer::builtin().unwrap();
        let text = failure_message(&renderer, FailureKind::PlayerNotFound, &FailureDetails::default())
            .unwrap();
        assert!(text.contains("which player"));
    }
}
