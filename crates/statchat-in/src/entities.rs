//! Entity extraction for questions.
//!
//! Extracts structured entities from text:
//! - Team filters ("3rd XI", "third team", "3s", "thirds")
//! - Season filters ("2019/20", "19/20", "2019 to 2020")
//! - Position filters ("keeper", "defender", "striker", ...)
//! - Capitalised names that are not known players
//! - First-person pronouns
//!
//! Filter extractors work on normalized text and report the span they
//! consumed so the caller can blank it before metric resolution.

use crate::normalizer::normalize;
use crate::players::PlayerDirectory;
use lazy_static::lazy_static;
use regex::Regex;
use statchat_core::{Position, Season, TeamCode};
use std::ops::Range;

lazy_static! {
    /// "3rd", "the 3rd xi", "for the 2nd team"; group 2 is the team word
    static ref TEAM_ORDINAL: Regex = Regex::new(
        r"\b(?:(?:for|in|with|from)\s+)?(?:the\s+)?([1-8])(?:st|nd|rd|th)(\s+(?:xi|team|eleven))?\b"
    ).unwrap();

    /// "3s", "for the 3s"
    static ref TEAM_CODE: Regex = Regex::new(
        r"\b(?:(?:for|in|with|from)\s+)?(?:the\s+)?([1-8])s\b"
    ).unwrap();

    /// "third team", "the firsts"; a bare "first" is not a team
    static ref TEAM_WORD: Regex = Regex::new(
        r"\b(?:(?:for|in|with|from)\s+)?(?:the\s+)?(first|second|third|fourth|fifth|sixth|seventh|eighth)(?:\s+(?:xi|team|eleven)|s)\b"
    ).unwrap();

    /// "2019/20", "in the 19/20 season", "2019 to 2020"
    static ref SEASON_RANGE: Regex = Regex::new(
        r"\b(?:(?:in|during|for)\s+)?(?:the\s+)?(\d{4}|\d{2})(?:\s*/\s*|\s+to\s+)(\d{4}|\d{2})(?:\s+season)?\b"
    ).unwrap();

    static ref POSITION_WORD: Regex = Regex::new(
        r"\b(?:(?:as|at)\s+(?:a\s+)?)?(goalkeepers?|keepers?|goalies?|defenders?|midfielders?|strikers?|forwards?)\b"
    ).unwrap();

    /// One capitalised word: "Smith", "O'Neill", "McDonald", "Ångström"
    static ref CAPITALISED_WORD: Regex = Regex::new(
        r"\b\p{Lu}\p{L}*(?:['\x{2019}\-]\p{L}+)*"
    ).unwrap();

    /// "has kieran smith scored": whatever sits between auxiliary and verb
    static ref VERB_SLOT: Regex = Regex::new(
        r"\b(?:has|have|had|did|does|do)\s+(.+?)\s+(?:scored|score|made|make|played|play|won|win|received|receive|kept|keep|missed|miss|conceded|concede|saved|save|averaged|average|travelled|travel|had|have|got|get|been)\b"
    ).unwrap();

    /// "luke bangs or kieran smith": the tail after a comparison joiner
    static ref COMPARED_SLOT: Regex = Regex::new(
        r"\b(?:or|vs|versus|than)\s+(.+)$"
    ).unwrap();
}

/// Nouns that make a bare ordinal something other than a team ("1st season")
const ORDINAL_NOUNS: &[&str] = &[
    "season", "seasons", "game", "games", "match", "matches", "appearance", "appearances",
    "goal", "goals", "year", "years", "half", "minute", "minutes", "start", "starts", "time",
    "place", "cap", "caps",
];

const TEAM_WORDS: [&str; 8] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth",
];

/// Question words that start a sentence in title case
const LEADING_STOPWORDS: &[&str] = &[
    "how", "who", "what", "which", "has", "have", "had", "did", "does", "do", "is", "are", "was",
    "top", "the", "compare", "show", "tell", "give", "list", "and", "or", "vs", "between", "can",
    "when", "where", "in", "for", "i", "could", "would",
];

/// Words that can fill a subject slot without naming anybody
const SLOT_FILLERS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "he", "him", "his", "she", "her", "they",
    "them", "their", "we", "us", "our", "it", "its", "the", "a", "an", "any", "anyone",
    "anybody", "someone", "somebody", "everyone", "everybody", "nobody", "this", "that", "these",
    "those", "there", "so", "far", "ever", "already", "actually", "really", "all", "total",
    "overall", "more", "most", "many", "much", "times", "time", "who", "which", "what", "then",
    "than", "been", "be", "not", "never", "in", "for", "at", "of", "on", "to", "by", "with",
    "from", "and", "or", "up", "front", "home", "away", "per", "as", "each", "every", "other",
    "others", "else", "one", "squad", "career", "last", "next", "previous", "before", "year",
    "years", "teammates", "teammate", "average", "usual", "expected",
];

/// Capitalised phrases that name stats or teams rather than people
const DOMAIN_WORDS: &[&str] = &[
    "team", "week", "season", "goals", "goal", "assists", "appearances", "xi", "home", "away",
    "player", "players", "club", "match", "month", "points", "cards", "sheets", "sheet",
];

const PRONOUNS: &[&str] = &["i", "me", "my", "mine", "myself"];

/// "tell me", "show me": the caller as listener, not subject
const REQUEST_VERBS: &[&str] = &["tell", "show", "give", "let", "help", "remind", "get", "find"];

/// "i want to know", "i would like": the caller as asker, not subject
const ASKING_VERBS: &[&str] = &["want", "would", "need", "like", "wonder", "wondered", "wondering", "see", "know", "ask"];

/// A filter value plus the normalized-text span it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found<T> {
    pub value: T,
    pub span: Range<usize>,
}

pub fn extract_team(normalized: &str) -> Option<Found<TeamCode>> {
    for pattern in [&*TEAM_ORDINAL, &*TEAM_CODE, &*TEAM_WORD] {
        let found = pattern.captures_iter(normalized).find_map(|caps| {
            let whole = caps.get(0)?;
            if is_bare_ordinal(pattern, &caps) && precedes_ordinal_noun(&normalized[whole.end()..]) {
                return None;
            }
            let token = caps.get(1)?.as_str();
            let number = match token.parse::<u8>() {
                Ok(n) => n,
                Err(_) => TEAM_WORDS.iter().position(|w| *w == token)? as u8 + 1,
            };
            TeamCode::new(number).map(|value| Found {
                value,
                span: whole.range(),
            })
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

fn is_bare_ordinal(pattern: &Regex, caps: &regex::Captures<'_>) -> bool {
    std::ptr::eq(pattern, &*TEAM_ORDINAL) && caps.get(2).is_none()
}

fn precedes_ordinal_noun(rest: &str) -> bool {
    rest.split_whitespace()
        .next()
        .is_some_and(|word| ORDINAL_NOUNS.contains(&word))
}

/// First valid year range. Ranges whose years do not follow on are ignored.
pub fn extract_season(normalized: &str) -> Option<Found<Season>> {
    SEASON_RANGE.captures_iter(normalized).find_map(|caps| {
        let start = caps.get(1)?.as_str().parse::<u16>().ok()?;
        let end = caps.get(2)?.as_str().parse::<u16>().ok()?;
        let value = Season::from_years(start, end)?;
        Some(Found {
            value,
            span: caps.get(0)?.range(),
        })
    })
}

pub fn extract_position(normalized: &str) -> Option<Found<Position>> {
    let caps = POSITION_WORD.captures(normalized)?;
    let word = caps.get(1)?.as_str();
    let singular = word.strip_suffix('s').unwrap_or(word);
    let value = match singular {
        "goalie" => Position::Goalkeeper,
        other => Position::parse(other)?,
    };
    Some(Found {
        value,
        span: caps.get(0)?.range(),
    })
}

/// Byte offset of the first first-person pronoun that names the caller as
/// a subject, if any.
pub fn find_pronoun(normalized: &str) -> Option<usize> {
    let words: Vec<&str> = normalized.split(' ').collect();
    let mut offset = 0;
    for (i, word) in words.iter().enumerate() {
        if PRONOUNS.contains(word) && is_subject_position(word, &words[..i], &words[i + 1..]) {
            return Some(offset);
        }
        offset += word.len() + 1;
    }
    None
}

fn is_subject_position(word: &str, before: &[&str], after: &[&str]) -> bool {
    match word {
        "me" => !before.last().is_some_and(|w| REQUEST_VERBS.contains(w)),
        "i" => !after.first().is_some_and(|w| ASKING_VERBS.contains(w)),
        _ => true,
    }
}

/// Capitalised multi-word names in the raw question that are not known
/// players and do not look like stat or team phrases.
///
/// Runs of capitalised words are normalized word by word; words covered by
/// a known player are removed, and what is left of the run is a candidate.
pub fn extract_unknown_names(raw: &str, directory: &PlayerDirectory) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for run in capitalised_runs(raw) {
        let normalized: Vec<String> = run.iter().map(|w| normalize(w)).collect();
        let known = known_words(&normalized, directory);

        let mut segment: Vec<&str> = Vec::new();
        for (i, word) in run.iter().enumerate() {
            if !known[i] {
                segment.push(*word);
            }
            if known[i] || i + 1 == run.len() {
                push_candidate(&segment, directory, &mut names);
                segment.clear();
            }
        }
    }
    names
}

/// Maximal runs of capitalised words separated only by whitespace.
fn capitalised_runs(raw: &str) -> Vec<Vec<&str>> {
    let mut runs: Vec<Vec<&str>> = Vec::new();
    let mut last_end: Option<usize> = None;
    for m in CAPITALISED_WORD.find_iter(raw) {
        let joined = last_end.is_some_and(|end| {
            let gap = &raw[end..m.start()];
            !gap.is_empty() && gap.chars().all(char::is_whitespace)
        });
        match runs.last_mut() {
            Some(run) if joined => run.push(m.as_str()),
            _ => runs.push(vec![m.as_str()]),
        }
        last_end = Some(m.end());
    }
    runs
}

/// Which words of a run fall inside a known player's name.
fn known_words(normalized: &[String], directory: &PlayerDirectory) -> Vec<bool> {
    let mut phrase = String::new();
    let mut ranges = Vec::with_capacity(normalized.len());
    for word in normalized {
        if !phrase.is_empty() {
            phrase.push(' ');
        }
        let start = phrase.len();
        phrase.push_str(word);
        ranges.push(start..phrase.len());
    }
    let hits = directory.find_in(&phrase);
    ranges
        .iter()
        .map(|range| {
            hits.iter()
                .any(|hit| hit.start < range.end && range.start < hit.end)
        })
        .collect()
}

fn push_candidate(segment: &[&str], directory: &PlayerDirectory, names: &mut Vec<String>) {
    let words: Vec<&str> = segment
        .iter()
        .copied()
        .skip_while(|w| LEADING_STOPWORDS.contains(&normalize(w).as_str()))
        .collect();
    if words.len() < 2 {
        return;
    }
    if words
        .iter()
        .any(|w| DOMAIN_WORDS.contains(&normalize(w).as_str()))
    {
        return;
    }
    let candidate = words.join(" ");
    let normalized = normalize(&candidate);
    if directory.canonicalise(&candidate).is_some() {
        return;
    }
    if !names.iter().any(|n| normalize(n) == normalized) {
        names.push(candidate);
    }
}

/// Words left in a subject slot of the residual question, once known and
/// capitalised names, filters and fillers are gone. `is_metric_word` says
/// whether a word belongs to the metric vocabulary.
pub fn extract_slot_names<F>(residual: &str, is_metric_word: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut names: Vec<String> = Vec::new();
    for slot in [&*VERB_SLOT, &*COMPARED_SLOT] {
        for caps in slot.captures_iter(residual) {
            let Some(content) = caps.get(1) else { continue };
            let words: Vec<&str> = content
                .as_str()
                .split_whitespace()
                .filter(|w| w.chars().all(char::is_alphabetic))
                .filter(|w| !SLOT_FILLERS.contains(w) && !DOMAIN_WORDS.contains(w))
                .filter(|w| !is_metric_word(*w))
                .collect();
            if words.is_empty() || words.len() > 3 {
                continue;
            }
            let name = words
                .iter()
                .map(|w| title_case(w))
                .collect::<Vec<_>>()
                .join(" ");
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replace a span with spaces, keeping other offsets stable.
pub fn blank(text: &mut String, span: Range<usize>) {
    let filler = " ".repeat(span.len());
    text.replace_range(span, &filler);
}
