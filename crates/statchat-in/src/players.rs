//! Known-player directory.
//!
//! Names are matched on word boundaries against normalized question text.
//! A single alternation ordered longest-first gives leftmost, longest,
//! non-overlapping matches in one pass.

use crate::normalizer::normalize;
use crate::ParseError;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// A directory hit: display name plus its byte span in the normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMatch {
    pub display_name: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    names: Vec<String>,
    by_normalized: HashMap<String, usize>,
    matcher: Option<Regex>,
}

impl PlayerDirectory {
    pub fn new<I, S>(names: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut display = Vec::new();
        let mut by_normalized = HashMap::new();
        for raw in names {
            let name = raw.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
            let key = normalize(&name);
            if key.is_empty() {
                warn!(name = raw.as_ref(), "skipping blank player name");
                continue;
            }
            if by_normalized.contains_key(&key) {
                continue;
            }
            by_normalized.insert(key, display.len());
            display.push(name);
        }

        let mut keys: Vec<&String> = by_normalized.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let matcher = if keys.is_empty() {
            None
        } else {
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"\b(?:{})\b", alternation))?)
        };

        Ok(PlayerDirectory {
            names: display,
            by_normalized,
            matcher,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Display form of a name, if it is a known player.
    pub fn canonicalise(&self, raw: &str) -> Option<&str> {
        self.by_normalized
            .get(&normalize(raw))
            .map(|&i| self.names[i].as_str())
    }

    /// Known players mentioned in `normalized`, in text order.
    pub fn find_in(&self, normalized: &str) -> Vec<PlayerMatch> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };
        matcher
            .find_iter(normalized)
            .filter_map(|m| {
                let &i = self.by_normalized.get(m.as_str())?;
                Some(PlayerMatch {
                    display_name: self.names[i].clone(),
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> PlayerDirectory {
        PlayerDirectory::new(["Luke Bangs", "Oli Goddard", "Luke", "  ", "luke bangs"]).unwrap()
    }

    #[test]
    fn test_dedupes_and_skips_blank() {
        let dir = directory();
        assert_eq!(dir.len(), 3);
        assert_eq!(dir.canonicalise("LUKE BANGS"), Some("Luke Bangs"));
        assert_eq!(dir.canonicalise("Kieran Smith"), None);
    }

    #[test]
    fn test_longest_match_wins() {
        let dir = directory();
        let hits = dir.find_in("has oli goddard scored more than luke bangs");
        let names: Vec<_> = hits.iter().map(|h| h.display_name.as_str()).collect();
        assert_eq!(names, vec!["Oli Goddard", "Luke Bangs"]);
    }

    #[test]
    fn test_word_boundaries() {
        let dir = directory();
        assert!(dir.find_in("lukewarm goals").is_empty());
    }

    #[test]
    fn test_empty_directory() {
        let dir = PlayerDirectory::new(Vec::<String>::new()).unwrap();
        assert!(dir.find_in("luke bangs").is_empty());
    }
}
