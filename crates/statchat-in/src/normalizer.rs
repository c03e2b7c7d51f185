//! Text normalization for question matching.
//!
//! Normalizes user input so that aliases and names match regardless of
//! case, punctuation and spacing:
//! - Lowercase conversion and quote unification
//! - Expansion of contractions, removal of possessives
//! - Year ranges "2019-20" become "2019/20"
//! - Punctuation becomes whitespace (except '/', '%' and decimal points)
//! - Common typo correction

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Common contractions and their expansions
    static ref CONTRACTIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("can't", "cannot");
        m.insert("won't", "will not");
        m.insert("don't", "do not");
        m.insert("doesn't", "does not");
        m.insert("didn't", "did not");
        m.insert("isn't", "is not");
        m.insert("aren't", "are not");
        m.insert("wasn't", "was not");
        m.insert("weren't", "were not");
        m.insert("haven't", "have not");
        m.insert("hasn't", "has not");
        m.insert("hadn't", "had not");
        m.insert("i'm", "i am");
        m.insert("i've", "i have");
        m.insert("i'd", "i would");
        m.insert("i'll", "i will");
        m.insert("it's", "it is");
        m.insert("that's", "that is");
        m.insert("there's", "there is");
        m.insert("what's", "what is");
        m.insert("who's", "who has");
        m.insert("how's", "how is");
        m.insert("let's", "let us");
        m
    };

    /// Common misspellings of statistic words
    static ref TYPO_CORRECTIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("apperances", "appearances");
        m.insert("appearences", "appearances");
        m.insert("appearence", "appearance");
        m.insert("asists", "assists");
        m.insert("assits", "assists");
        m.insert("golas", "goals");
        m.insert("gaols", "goals");
        m.insert("penalites", "penalties");
        m.insert("penaltys", "penalties");
        m.insert("yelow", "yellow");
        m.insert("minuets", "minutes");
        m.insert("cleansheets", "clean sheets");
        m.insert("cleansheet", "clean sheet");
        m
    };

    /// A word carrying an apostrophe
    static ref APOSTROPHE_WORD: Regex = Regex::new(r"[a-z0-9]+(?:'[a-z]*)+").unwrap();

    /// "2019-20", "2019 - 2020"
    static ref YEAR_DASH: Regex = Regex::new(r"(\d)\s*-\s*(\d)").unwrap();
}

/// Normalize text for pattern matching
pub fn normalize(text: &str) -> String {
    let lowered = text
        .to_lowercase()
        .replace(['\u{2019}', '\u{2018}', '`'], "'");

    let expanded = APOSTROPHE_WORD.replace_all(&lowered, |caps: &regex::Captures| {
        let word = &caps[0];
        if let Some(expansion) = CONTRACTIONS.get(word) {
            return expansion.to_string();
        }
        let stem = word.strip_suffix("'s").unwrap_or(word);
        stem.replace('\'', "")
    });

    let ranged = YEAR_DASH.replace_all(&expanded, "$1/$2");
    let cleaned = strip_punctuation(&ranged);

    cleaned
        .split_whitespace()
        .map(|word| TYPO_CORRECTIONS.get(word).copied().unwrap_or(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            c if c.is_alphanumeric() || c.is_whitespace() => out.push(c),
            '/' | '%' => out.push(c),
            '.' => {
                let between_digits = i > 0
                    && chars[i - 1].is_ascii_digit()
                    && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                out.push(if between_digits { '.' } else { ' ' });
            }
            '&' => out.push_str(" and "),
            _ => out.push(' '),
        }
    }
    out
}

/// True when the question has nothing to work with.
pub fn is_empty_question(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}

/// Whole-word membership in normalized text.
pub fn contains_word(normalized: &str, word: &str) -> bool {
    normalized.split_whitespace().any(|w| w == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_normalization() {
        assert_eq!(normalize("  How many GOALS   has Luke Bangs scored?  "), "how many goals has luke bangs scored");
    }

    #[test]
    fn test_contractions_and_possessives() {
        assert_eq!(normalize("Who's got more?"), "who has got more");
        assert_eq!(normalize("What is Luke Bangs's best?"), "what is luke bangs best");
        assert_eq!(normalize("Luke Bangs' team"), "luke bangs team");
        assert_eq!(normalize("I\u{2019}ve scored"), "i have scored");
    }

    #[test]
    fn test_keeps_numbers_intact() {
        assert_eq!(normalize("goals in 2019-20"), "goals in 2019/20");
        assert_eq!(normalize("0.45 goals, 55% wins."), "0.45 goals 55% wins");
    }

    #[test]
    fn test_typos() {
        assert_eq!(normalize("how many asists"), "how many assists");
        assert_eq!(normalize("cleansheets"), "clean sheets");
    }

    #[test]
    fn test_empty_detection() {
        assert!(is_empty_question(""));
        assert!(is_empty_question("  ?!... "));
        assert!(!is_empty_question("goals?"));
    }
}
