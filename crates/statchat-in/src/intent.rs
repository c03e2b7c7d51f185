//! Intent classification: lookup, comparison or ranking.

use crate::normalizer::contains_word;
use lazy_static::lazy_static;
use regex::Regex;
use statchat_core::{Intent, RankDirection};

lazy_static! {
    static ref RANKED: Regex = Regex::new(r"\brank(?:ed|ing|ings)?\b").unwrap();

    /// "top 3", "best five", "3 best"
    static ref LIMIT_AFTER_CUE: Regex = Regex::new(
        r"\b(?:top|best|worst|leading|bottom|highest|lowest|most|fewest|least)\s+(\d+|one|two|three|four|five|six|seven|eight|nine|ten)\b"
    ).unwrap();
    static ref LIMIT_BEFORE_CUE: Regex = Regex::new(
        r"\b(\d+|one|two|three|four|five|six|seven|eight|nine|ten)\s+(?:top|best|worst|leading|highest|lowest)\b"
    ).unwrap();
}

const STRONG_RANKING_CUES: &[&str] = &["top", "best", "worst", "leading", "bottom"];
const WEAK_RANKING_CUES: &[&str] = &["most", "fewest", "least", "highest", "lowest"];
const COMPARISON_CUES: &[&str] = &[
    "more", "fewer", "less", "compare", "compared", "comparison", "vs", "versus", "better",
    "worse", "higher", "lower",
];
const ASCENDING_CUES: &[&str] = &[
    "worst", "worse", "fewer", "fewest", "less", "least", "lower", "lowest", "bottom",
];
const NUMBER_WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// What the classifier needs to know beyond the text itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentSignals {
    /// Players named in the question, known or not
    pub named_subjects: usize,
    /// A first-person pronoun was used
    pub pronoun: bool,
    pub has_metric: bool,
    /// The resolved metric is superlative ("most common position")
    pub superlative_metric: bool,
}

impl IntentSignals {
    fn explicit_subjects(&self) -> usize {
        self.named_subjects + usize::from(self.pronoun)
    }
}

/// Classify intent. `text` is the residual normalized question with names
/// and filters blanked out.
pub fn classify(text: &str, signals: IntentSignals) -> Intent {
    if is_ranking(text, signals) {
        return Intent::Ranking;
    }
    let explicit = signals.explicit_subjects();
    if explicit >= 2 || (explicit >= 1 && has_comparison_cue(text)) {
        return Intent::Comparison;
    }
    if signals.has_metric && !has_comparison_cue(text) {
        // The subject may still come from the caller's context
        return Intent::Lookup;
    }
    Intent::Unclear
}

pub fn is_ranking(text: &str, signals: IntentSignals) -> bool {
    if STRONG_RANKING_CUES.iter().any(|cue| contains_word(text, cue)) || RANKED.is_match(text) {
        return true;
    }
    signals.explicit_subjects() == 0
        && !signals.superlative_metric
        && WEAK_RANKING_CUES.iter().any(|cue| contains_word(text, cue))
}

pub fn has_comparison_cue(text: &str) -> bool {
    COMPARISON_CUES.iter().any(|cue| contains_word(text, cue))
        || text.split_whitespace().collect::<Vec<_>>().windows(2).any(|w| w == ["who", "has"])
}

pub fn direction(text: &str) -> RankDirection {
    if ASCENDING_CUES.iter().any(|cue| contains_word(text, cue)) {
        RankDirection::Ascending
    } else {
        RankDirection::Descending
    }
}

/// Explicit rank limit next to a ranking cue, clamped to `1..=max`.
pub fn rank_limit(text: &str, default: u32, max: u32) -> u32 {
    let raw = LIMIT_AFTER_CUE
        .captures(text)
        .or_else(|| LIMIT_BEFORE_CUE.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_number(m.as_str()));
    raw.unwrap_or(default).clamp(1, max.max(1))
}

fn parse_number(token: &str) -> Option<u32> {
    token.parse().ok().or_else(|| {
        NUMBER_WORDS
            .iter()
            .position(|w| *w == token)
            .map(|i| i as u32 + 1)
    })
}
