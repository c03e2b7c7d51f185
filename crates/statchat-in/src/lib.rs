//! Question understanding for the stats chatbot.
//!
//! Turns a free-text question plus the caller's default subject into a
//! [`ParsedQuestion`]: who is asked about, which catalog metric, which
//! filters, and whether this is a lookup, comparison or ranking.
//!
//! # Example
//!
//! ```ignore
//! use statchat_in::{ParserOptions, PlayerDirectory, QuestionParser};
//!
//! let parser = QuestionParser::new(registry, directory, ParserOptions::default());
//! let outcome = parser.parse(&QuestionContext::new("How many goals has Luke Bangs scored?", ""));
//! assert_eq!(outcome.parsed.metric_key.as_deref(), Some("G"));
//! ```

pub mod entities;
pub mod intent;
pub mod matcher;
pub mod normalizer;
pub mod players;

use entities::{
    blank, extract_position, extract_season, extract_slot_names, extract_team,
    extract_unknown_names, find_pronoun,
};
use intent::IntentSignals;
use serde::Serialize;
use statchat_core::{
    Filters, Intent, ParsedQuestion, Position, QuestionContext, RankDirection, StatchatError,
};
use statchat_registry::StatRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use matcher::MetricMatch;
pub use players::{PlayerDirectory, PlayerMatch};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("player directory pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<ParseError> for StatchatError {
    fn from(err: ParseError) -> Self {
        StatchatError::ParseError(err.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    pub max_subjects: usize,
    pub default_rank_limit: u32,
    pub max_rank_limit: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_subjects: 3,
            default_rank_limit: 1,
            max_rank_limit: 10,
        }
    }
}

/// How the parse was reached; feeds failure classification and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseAnalysis {
    pub normalized: String,
    /// No alphanumeric content at all
    pub empty: bool,
    /// The question named players (known or not) or used a pronoun
    pub explicit_subjects: bool,
    pub pronoun: bool,
    /// The subject came from userContext because the question named nobody
    pub defaulted_subject: bool,
    pub matched_alias: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub parsed: ParsedQuestion,
    pub analysis: ParseAnalysis,
}

/// Stateless parser over a shared catalog and player directory.
#[derive(Debug, Clone)]
pub struct QuestionParser {
    registry: Arc<StatRegistry>,
    directory: Arc<PlayerDirectory>,
    options: ParserOptions,
}

impl QuestionParser {
    pub fn new(
        registry: Arc<StatRegistry>,
        directory: Arc<PlayerDirectory>,
        options: ParserOptions,
    ) -> Self {
        Self {
            registry,
            directory,
            options,
        }
    }

    pub fn registry(&self) -> &StatRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    pub fn parse(&self, context: &QuestionContext) -> ParseOutcome {
        let question = context.question.as_str();
        if normalizer::is_empty_question(question) {
            return ParseOutcome {
                parsed: ParsedQuestion::unclear(),
                analysis: ParseAnalysis {
                    empty: true,
                    ..Default::default()
                },
            };
        }

        let normalized = normalizer::normalize(question);
        let mut residual = normalized.clone();

        // Subjects, keyed by offset so they stay in question order
        let mut subjects: Vec<(usize, String)> = Vec::new();
        let mut unresolved: Vec<String> = Vec::new();
        for hit in self.directory.find_in(&normalized) {
            blank(&mut residual, hit.start..hit.end);
            if !subjects.iter().any(|(_, name)| *name == hit.display_name) {
                subjects.push((hit.start, hit.display_name));
            }
        }
        for name in extract_unknown_names(question, &self.directory) {
            let key = normalizer::normalize(&name);
            if let Some(start) = residual.find(&key) {
                blank(&mut residual, start..start + key.len());
            }
            unresolved.push(name);
        }
        let mut named_subjects = subjects.len() + unresolved.len();

        let pronoun_at = find_pronoun(&normalized);
        if let Some(offset) = pronoun_at {
            match context.default_subject() {
                Some(raw) => match self.directory.canonicalise(raw) {
                    Some(name) => {
                        if !subjects.iter().any(|(_, n)| n == name) {
                            subjects.push((offset, name.to_string()));
                        }
                    }
                    None => unresolved.push(raw.to_string()),
                },
                None => debug!("pronoun used without a userContext subject"),
            }
        }
        subjects.sort_by_key(|(offset, _)| *offset);

        let mut filters = Filters::default();
        if let Some(found) = extract_team(&residual) {
            filters.team = Some(found.value);
            blank(&mut residual, found.span);
        }
        if let Some(found) = extract_season(&residual) {
            filters.season = Some(found.value);
            blank(&mut residual, found.span);
        }
        let mut residual = residual.split_whitespace().collect::<Vec<_>>().join(" ");

        // Names the capitalisation pass missed ("has kieran smith scored")
        let registry = &self.registry;
        let slot_names = extract_slot_names(&residual, |word| {
            matcher::resolve_metric(word, registry).is_some()
        });
        if !slot_names.is_empty() {
            let keys: Vec<String> = slot_names.iter().map(|n| normalizer::normalize(n)).collect();
            residual = residual
                .split_whitespace()
                .filter(|word| !keys.iter().any(|key| key.split(' ').any(|k| k == *word)))
                .collect::<Vec<_>>()
                .join(" ");
            for (name, key) in slot_names.into_iter().zip(keys) {
                if !unresolved.iter().any(|n| normalizer::normalize(n) == key) {
                    unresolved.push(name);
                    named_subjects += 1;
                }
            }
        }
        let explicit_subjects = named_subjects > 0 || pronoun_at.is_some();

        let (metric, position) = self.resolve_metric(&mut residual);
        if let Some(position) = position {
            filters.position = Some(position);
        }
        let mut metric_key = metric.as_ref().map(|m| m.key().to_string());
        let matched_alias = metric.as_ref().map(|m| m.alias.clone());
        let superlative_metric = metric.as_ref().is_some_and(|m| m.definition.superlative);

        // "goals for the 3rd XI" is its own catalog entry
        if let (Some(key), Some(team)) = (&metric_key, filters.team) {
            if let Some(specialised) = self.registry.specialise(key, team) {
                metric_key = Some(specialised.key.clone());
                filters.team = None;
            }
        }

        let signals = IntentSignals {
            named_subjects: named_subjects.min(self.options.max_subjects),
            pronoun: pronoun_at.is_some(),
            has_metric: metric_key.is_some(),
            superlative_metric,
        };
        let mut intent = intent::classify(&residual, signals);

        let mut defaulted_subject = false;
        if !explicit_subjects && intent == Intent::Lookup {
            if let Some(raw) = context.default_subject() {
                defaulted_subject = true;
                match self.directory.canonicalise(raw) {
                    Some(name) => subjects.push((0, name.to_string())),
                    None => unresolved.push(raw.to_string()),
                }
            }
        }

        let (subjects, unresolved) = if intent == Intent::Ranking {
            (Vec::new(), Vec::new())
        } else {
            let mut subjects: Vec<String> = subjects.into_iter().map(|(_, n)| n).collect();
            subjects.truncate(self.options.max_subjects);
            let room = self.options.max_subjects.saturating_sub(subjects.len());
            unresolved.truncate(room);
            (subjects, unresolved)
        };

        // One player found and the rest not: answer about that one
        if intent == Intent::Comparison && subjects.len() == 1 && !unresolved.is_empty() {
            debug!(unresolved = ?unresolved, "comparison degraded to lookup");
            intent = Intent::Lookup;
        }

        let (rank_limit, rank_direction) = match intent {
            Intent::Ranking => (
                Some(intent::rank_limit(
                    &residual,
                    self.options.default_rank_limit,
                    self.options.max_rank_limit,
                )),
                intent::direction(&residual),
            ),
            Intent::Comparison => (None, intent::direction(&residual)),
            _ => (None, RankDirection::Descending),
        };

        let parsed = ParsedQuestion {
            intent,
            subjects,
            unresolved_subjects: unresolved,
            metric_key,
            filters,
            rank_limit,
            rank_direction,
        };
        debug!(
            intent = ?parsed.intent,
            metric = ?parsed.metric_key,
            subjects = ?parsed.subjects,
            unresolved = ?parsed.unresolved_subjects,
            "parsed question"
        );

        ParseOutcome {
            parsed,
            analysis: ParseAnalysis {
                normalized,
                empty: false,
                explicit_subjects,
                pronoun: pronoun_at.is_some(),
                defaulted_subject,
                matched_alias,
            },
        }
    }

    /// Resolve the metric. A positional count that sits next to another
    /// metric ("minutes ... in goal") becomes a position filter on it.
    fn resolve_metric(&self, residual: &mut String) -> (Option<MetricMatch<'_>>, Option<Position>) {
        let Some(best) = matcher::resolve_metric(residual, &self.registry) else {
            return (None, None);
        };

        if best.is_positional_count() {
            let mut rest = residual.clone();
            blank(&mut rest, best.span.clone());
            let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
            if let Some(other) = matcher::resolve_non_positional(&rest, &self.registry) {
                let position = Position::parse(&best.definition.key);
                *residual = rest;
                return (Some(other), position);
            }
            return (Some(best), None);
        }

        let position = extract_position(residual).map(|found| {
            blank(residual, found.span);
            found.value
        });
        if position.is_some() {
            *residual = residual.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        (Some(best), position)
    }
}

/// One-shot parse without constructing a long-lived parser.
pub fn parse_question(
    context: &QuestionContext,
    registry: Arc<StatRegistry>,
    directory: Arc<PlayerDirectory>,
    options: ParserOptions,
) -> ParseOutcome {
    QuestionParser::new(registry, directory, options).parse(context)
}
