//! Query filters: club team (1st–8th XI), season and playing position.
//!
//! Each filter has exactly one canonical form. Parsing accepts the shapes the
//! data layer and the extractor produce; display forms are what answers show.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of narrowing a filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Team,
    Season,
    Position,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Team => "team",
            FilterKind::Season => "season",
            FilterKind::Position => "position",
        };
        f.write_str(name)
    }
}

/// One of the club's eight XIs, canonical code "1s".."8s".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamCode(u8);

impl TeamCode {
    pub const MAX: u8 = 8;

    pub fn new(number: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&number).then_some(TeamCode(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Canonical short code, e.g. "3s"
    pub fn code(&self) -> String {
        format!("{}s", self.0)
    }

    /// Ordinal form, e.g. "3rd"
    pub fn ordinal(&self) -> String {
        let suffix = match self.0 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        };
        format!("{}{}", self.0, suffix)
    }

    /// Answer form, e.g. "3rd XI"
    pub fn display_name(&self) -> String {
        format!("{} XI", self.ordinal())
    }

    /// Parse the forms the data layer uses: "3s", "3rd", "3rd XI", "3".
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        let lower = lower.strip_suffix(" xi").unwrap_or(&lower).trim();
        let digits: String = lower.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        let rest = &lower[digits.len()..];
        if !matches!(rest, "" | "s" | "st" | "nd" | "rd" | "th") {
            return None;
        }
        digits.parse().ok().and_then(Self::new)
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl TryFrom<String> for TeamCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TeamCode::parse(&value).ok_or_else(|| format!("invalid team code '{}'", value))
    }
}

impl From<TeamCode> for String {
    fn from(team: TeamCode) -> Self {
        team.code()
    }
}

/// A club season, canonical form "YYYY/YY".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season {
    start_year: u16,
}

impl Season {
    pub fn new(start_year: u16) -> Option<Self> {
        (1900..=2098).contains(&start_year).then_some(Season { start_year })
    }

    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    /// Build from a start and end year, either of which may be two-digit.
    /// The end year must follow the start year.
    pub fn from_years(start: u16, end: u16) -> Option<Self> {
        let start = if start < 100 { 2000 + start } else { start };
        if start > 9999 {
            return None;
        }
        let end_two = end % 100;
        if (start + 1) % 100 != end_two {
            return None;
        }
        if end >= 100 && end != start + 1 {
            return None;
        }
        Self::new(start)
    }

    /// Parse "2019/20", "2019/2020", "2019-20", "19/20".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (start, end) = trimmed
            .split_once('/')
            .or_else(|| trimmed.split_once('-'))?;
        let start: u16 = start.trim().parse().ok()?;
        let end: u16 = end.trim().parse().ok()?;
        Self::from_years(start, end)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}

impl TryFrom<String> for Season {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Season::parse(&value).ok_or_else(|| format!("invalid season '{}'", value))
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.to_string()
    }
}

/// Canonical playing positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    pub fn code(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
        }
    }

    /// Parse a code or a role word as stored by the data layer.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "gk" | "goalkeeper" | "keeper" => Some(Position::Goalkeeper),
            "def" | "defender" => Some(Position::Defender),
            "mid" | "midfielder" => Some(Position::Midfielder),
            "fwd" | "forward" | "striker" => Some(Position::Forward),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The optional narrowing conditions on a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    pub team: Option<TeamCode>,
    pub season: Option<Season>,
    pub position: Option<Position>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.team.is_none() && self.season.is_none() && self.position.is_none()
    }

    /// Kinds of filter present, in a fixed order.
    pub fn kinds(&self) -> Vec<FilterKind> {
        let mut kinds = Vec::new();
        if self.team.is_some() {
            kinds.push(FilterKind::Team);
        }
        if self.season.is_some() {
            kinds.push(FilterKind::Season);
        }
        if self.position.is_some() {
            kinds.push(FilterKind::Position);
        }
        kinds
    }
}
