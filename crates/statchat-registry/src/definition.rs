//! One compiled catalog entry and the patterns derived from it.

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use statchat_core::{FilterKind, Position, Season, StatValue, TeamCode};

/// Catalog grouping, used for zero-phrase fallbacks and the registry listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Basic,
    Advanced,
    HomeAway,
    TeamSpecific,
    Seasonal,
    Positional,
}

/// How a value looks when it reaches an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueShape {
    /// Whole number
    Count,
    /// Rate with a fixed number of decimals
    Decimal,
    /// Rate shown with a trailing '%'
    Percentage,
    /// Text such as a team, season or position
    Label,
}

impl ValueShape {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ValueShape::Label)
    }
}

/// What a label value names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Team,
    Season,
    Position,
}

impl LabelKind {
    /// Canonical display form of a raw label, or None if it is not one.
    pub fn canonicalise(&self, raw: &str) -> Option<String> {
        match self {
            LabelKind::Team => TeamCode::parse(raw).map(|t| t.display_name()),
            LabelKind::Season => Season::parse(raw).map(|s| s.to_string()),
            LabelKind::Position => Position::parse(raw).map(|p| p.display_name().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounForms {
    pub singular: String,
    pub plural: String,
}

impl NounForms {
    pub fn for_value(&self, value: f64) -> &str {
        if value == 1.0 {
            &self.singular
        } else {
            &self.plural
        }
    }
}

/// How the data layer computes the value from a player's match rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueQuery {
    /// A single aggregate expression over `md`
    Aggregate { expression: String },
    /// The most frequent `field` value, weighted by `weight`
    ModeOf { field: String, weight: String },
}

/// Compiled alias phrase. `...` in the phrase allows a gap of up to three words.
#[derive(Debug, Clone)]
pub struct AliasPattern {
    pub phrase: String,
    pub regex: Regex,
    /// Literal characters matched; longer aliases win
    pub weight: usize,
    /// True for the metric's own name
    pub canonical: bool,
}

impl AliasPattern {
    pub fn compile(phrase: &str, canonical: bool) -> Result<Self, regex::Error> {
        let phrase = phrase.trim().to_lowercase();
        let segments: Vec<String> = phrase
            .split("...")
            .map(|segment| {
                segment
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .filter(|segment| !segment.is_empty())
            .collect();
        let body = segments.join(r"(?:\s+\S+){0,3}\s+");
        let regex = Regex::new(&format!(r"(?:^|\s){}(?:\s|$)", body))?;
        let weight = phrase
            .split("...")
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .len();
        Ok(AliasPattern {
            phrase,
            regex,
            weight,
            canonical,
        })
    }

    pub fn is_match(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }
}

/// Recognises the value inside a well-formed answer sentence.
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    shape: ValueShape,
    decimal_places: u8,
    label: Option<LabelKind>,
    regex: Regex,
}

const NUMBER_PATTERN: &str = r"(?:^|[^\w./])(\d+(?:\.\d+)?)(%?)(?:[^\w/%]|$)";
const LABEL_PATTERN: &str = r"\bis ([A-Za-z0-9][A-Za-z0-9/ ]{0,39})[.!?]$";

impl ExtractionPattern {
    pub(crate) fn new(
        shape: ValueShape,
        decimal_places: u8,
        label: Option<LabelKind>,
    ) -> Result<Self, regex::Error> {
        let source = match shape {
            ValueShape::Label => LABEL_PATTERN,
            _ => NUMBER_PATTERN,
        };
        Ok(ExtractionPattern {
            shape,
            decimal_places,
            label,
            regex: Regex::new(source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Pull the value out of an answer. Numbers must carry exactly the
    /// configured decimals, and a '%' exactly when the shape is a percentage.
    pub fn extract(&self, answer: &str) -> Option<StatValue> {
        let answer = answer.trim();
        if self.shape == ValueShape::Label {
            let raw = self.regex.captures(answer)?.get(1)?.as_str().trim();
            let canonical = match self.label {
                Some(kind) => kind.canonicalise(raw)?,
                None => raw.to_string(),
            };
            return Some(StatValue::Label(canonical));
        }

        let wants_percent = self.shape == ValueShape::Percentage;
        self.regex.captures_iter(answer).find_map(|caps| {
            let digits = caps.get(1)?.as_str();
            let has_percent = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
            let decimals = digits.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
            if has_percent != wants_percent || decimals != self.decimal_places as usize {
                return None;
            }
            digits.parse::<f64>().ok().map(StatValue::Number)
        })
    }
}

impl Serialize for ExtractionPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A compiled catalog entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatDefinition {
    pub key: String,
    /// Canonical lowercase metric name
    pub metric: String,
    pub aliases: Vec<String>,
    pub question_template: String,
    pub decimal_places: u8,
    pub category: Category,
    pub shape: ValueShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelKind>,
    pub verb: String,
    pub noun: NounForms,
    /// Filters this metric may be narrowed by
    pub filters: Vec<FilterKind>,
    /// Zero means "no appearances" when the player has none
    pub per_appearance: bool,
    /// Only eligible when the question carries a superlative cue
    pub superlative: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamCode>,
    pub query: ValueQuery,
    pub extraction_pattern: ExtractionPattern,
    #[serde(skip)]
    pub alias_patterns: Vec<AliasPattern>,
}

impl StatDefinition {
    pub fn is_numeric(&self) -> bool {
        self.shape.is_numeric()
    }

    pub fn allows(&self, kind: FilterKind) -> bool {
        self.filters.contains(&kind)
    }

    /// The sample question with `{player}` filled in.
    pub fn question_for(&self, player: &str) -> String {
        self.question_template.replace("{player}", player)
    }

    pub fn extract_value(&self, answer: &str) -> Option<StatValue> {
        self.extraction_pattern.extract(answer)
    }

    /// Format a number the way answers show it.
    pub fn format_number(&self, value: f64) -> String {
        let places = self.decimal_places as usize;
        let text = format!("{:.*}", places, value);
        match self.shape {
            ValueShape::Percentage => format!("{}%", text),
            _ => text,
        }
    }

    pub fn noun_for(&self, value: f64) -> &str {
        match self.shape {
            ValueShape::Count => self.noun.for_value(value),
            _ => &self.noun.plural,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate() -> ExtractionPattern {
        ExtractionPattern::new(ValueShape::Decimal, 2, None).unwrap()
    }

    #[test]
    fn test_alias_gap() {
        let alias = AliasPattern::compile("penalties ... scored", false).unwrap();
        assert!(alias.is_match("how many penalties has luke bangs scored"));
        assert!(alias.is_match("penalties scored"));
        assert!(!alias.is_match("how many penalties has luke bangs ever really actually scored"));
        assert_eq!(alias.weight, "penalties scored".len());
    }

    #[test]
    fn test_alias_word_boundaries() {
        let alias = AliasPattern::compile("goal", false).unwrap();
        assert!(alias.is_match("top goal scorer"));
        assert!(!alias.is_match("goals"));
        assert!(!alias.is_match("goalkeeper"));
    }

    #[test]
    fn test_extracts_rate_with_exact_decimals() {
        let pattern = rate();
        assert_eq!(
            pattern.extract("Luke Bangs has averaged 0.45 goals per appearance."),
            Some(StatValue::Number(0.45))
        );
        assert_eq!(pattern.extract("Luke Bangs has averaged 0.5 goals per appearance."), None);
    }

    #[test]
    fn test_skips_season_and_team_numbers() {
        let pattern = ExtractionPattern::new(ValueShape::Count, 0, None).unwrap();
        assert_eq!(
            pattern.extract("Luke Bangs has scored 7 goals for the 3rd XI in the 2019/20 season."),
            Some(StatValue::Number(7.0))
        );
    }

    #[test]
    fn test_percentage_requires_sign() {
        let pattern = ExtractionPattern::new(ValueShape::Percentage, 1, None).unwrap();
        assert_eq!(
            pattern.extract("Luke Bangs has won 55.0% of games."),
            Some(StatValue::Number(55.0))
        );
        assert_eq!(pattern.extract("Luke Bangs has won 55.0 of games."), None);
    }

    #[test]
    fn test_label_is_canonicalised() {
        let pattern = ExtractionPattern::new(ValueShape::Label, 0, Some(LabelKind::Team)).unwrap();
        assert_eq!(
            pattern.extract("Luke Bangs' most played for team is 2nd XI."),
            Some(StatValue::Label("2nd XI".to_string()))
        );
        assert_eq!(pattern.extract("Luke Bangs' most played for team is Chelsea."), None);
    }
}
