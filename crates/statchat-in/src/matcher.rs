//! Metric resolution.
//!
//! Scans every catalog entry's canonical name and aliases against the
//! residual question text and keeps the most specific hit: the longest
//! literal alias wins, then a canonical-name hit, then catalog order.
//! Superlative metrics only compete when the question carries a
//! superlative cue.

use crate::normalizer::contains_word;
use statchat_registry::{Category, StatDefinition, StatRegistry};
use std::ops::Range;

const SUPERLATIVE_CUES: &[&str] = &[
    "most", "usual", "main", "favourite", "favorite", "preferred", "busiest", "prolific",
    "commonest",
];

/// A resolved metric
#[derive(Debug, Clone)]
pub struct MetricMatch<'r> {
    pub definition: &'r StatDefinition,
    /// The alias phrase that matched
    pub alias: String,
    pub span: Range<usize>,
    score: (usize, bool, std::cmp::Reverse<usize>),
}

impl MetricMatch<'_> {
    pub fn key(&self) -> &str {
        &self.definition.key
    }

    /// A plain positional count ("in goal", "up front")
    pub fn is_positional_count(&self) -> bool {
        self.definition.category == Category::Positional && !self.definition.superlative
    }
}

pub fn has_superlative_cue(text: &str) -> bool {
    SUPERLATIVE_CUES.iter().any(|cue| contains_word(text, cue))
}

/// Resolve the best-matching metric in `text`.
pub fn resolve_metric<'r>(text: &str, registry: &'r StatRegistry) -> Option<MetricMatch<'r>> {
    resolve_where(text, registry, |_| true)
}

/// Like [`resolve_metric`] but ignoring positional counts.
pub fn resolve_non_positional<'r>(
    text: &str,
    registry: &'r StatRegistry,
) -> Option<MetricMatch<'r>> {
    resolve_where(text, registry, |def| def.category != Category::Positional)
}

fn resolve_where<'r, F>(text: &str, registry: &'r StatRegistry, eligible: F) -> Option<MetricMatch<'r>>
where
    F: Fn(&StatDefinition) -> bool,
{
    let superlative_cue = has_superlative_cue(text);
    let mut best: Option<MetricMatch<'r>> = None;

    for (index, def) in registry.iter().enumerate() {
        if def.superlative && !superlative_cue {
            continue;
        }
        if !eligible(def) {
            continue;
        }
        for alias in &def.alias_patterns {
            let Some(hit) = alias.regex.find(text) else {
                continue;
            };
            let score = (alias.weight, alias.canonical, std::cmp::Reverse(index));
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(MetricMatch {
                    definition: def,
                    alias: alias.phrase.clone(),
                    span: hit.range(),
                    score,
                });
            }
        }
    }
    best
}
