//! Result shape checks.
//!
//! Raw rows from the data layer become typed [`StatValue`]s here. Numeric
//! metrics treat missing data as zero; label metrics treat it as
//! [`StatValue::Missing`]. Anything else that does not fit the metric's
//! shape is a data error.

use crate::client::{RawValue, ResultRow};
use crate::error::QueryError;
use serde::Serialize;
use statchat_core::{RankDirection, StatValue};
use statchat_registry::StatDefinition;
use std::cmp::Ordering;
use tracing::debug;

/// One row of a ranking after shape checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub player: String,
    pub value: f64,
}

fn is_blank_marker(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a")
}

/// Check one raw value against the metric's shape.
pub fn to_stat_value(def: &StatDefinition, raw: &RawValue) -> Result<StatValue, QueryError> {
    if def.is_numeric() {
        let number = match raw {
            RawValue::Number(n) if n.is_finite() => *n,
            RawValue::Number(_) | RawValue::Null => 0.0,
            RawValue::Text(text) if is_blank_marker(text) => 0.0,
            RawValue::Text(text) => match text.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => n,
                _ => {
                    return Err(QueryError::TypeMismatch {
                        key: def.key.clone(),
                        expected: "numeric",
                        found: text.clone(),
                    })
                }
            },
        };
        if number < 0.0 {
            return Err(QueryError::NegativeValue {
                key: def.key.clone(),
                value: number,
            });
        }
        return Ok(StatValue::Number(number));
    }

    match raw {
        RawValue::Null => Ok(StatValue::Missing),
        RawValue::Text(text) if is_blank_marker(text) => Ok(StatValue::Missing),
        RawValue::Text(text) => {
            let canonical = def
                .label
                .and_then(|kind| kind.canonicalise(text))
                .unwrap_or_else(|| text.trim().to_string());
            Ok(StatValue::Label(canonical))
        }
        RawValue::Number(n) => Err(QueryError::TypeMismatch {
            key: def.key.clone(),
            expected: "label",
            found: n.to_string(),
        }),
    }
}

/// Value for a lookup. No rows means the player never appeared under
/// these filters.
pub fn lookup_value(def: &StatDefinition, rows: &[ResultRow]) -> Result<StatValue, QueryError> {
    match rows.first() {
        Some(row) => to_stat_value(def, &row.value),
        None if def.is_numeric() => Ok(StatValue::Number(0.0)),
        None => Ok(StatValue::Missing),
    }
}

/// Shape-check and order ranking rows. Ties are broken by player name.
/// Rows with no usable value are skipped rather than ranked as zero.
pub fn ranked_entries(
    def: &StatDefinition,
    rows: &[ResultRow],
    direction: RankDirection,
    limit: u32,
) -> Result<Vec<RankedEntry>, QueryError> {
    let mut entries: Vec<RankedEntry> = Vec::with_capacity(rows.len());
    for row in rows {
        let usable = match &row.value {
            RawValue::Number(n) => n.is_finite(),
            RawValue::Null => false,
            RawValue::Text(text) => !is_blank_marker(text),
        };
        if !usable {
            debug!(player = %row.player, metric = %def.key, "skipping ranking row without a value");
            continue;
        }
        let Some(value) = to_stat_value(def, &row.value)?.as_number() else {
            return Err(QueryError::NotOrderable(def.key.clone()));
        };
        if entries.iter().any(|e| e.player == row.player) {
            continue;
        }
        entries.push(RankedEntry {
            player: row.player.clone(),
            value,
        });
    }

    entries.sort_by(|a, b| {
        let by_value = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
        let by_value = match direction {
            RankDirection::Ascending => by_value,
            RankDirection::Descending => by_value.reverse(),
        };
        by_value.then_with(|| a.player.cmp(&b.player))
    });
    entries.truncate(limit as usize);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statchat_registry::StatRegistry;

    fn row(player: &str, value: RawValue) -> ResultRow {
        ResultRow {
            player: player.to_string(),
            value,
        }
    }

    #[test]
    fn test_numeric_missing_is_zero() {
        let registry = StatRegistry::builtin().unwrap();
        let def = registry.get("G").unwrap();
        assert_eq!(to_stat_value(def, &RawValue::Null).unwrap(), StatValue::Number(0.0));
        assert_eq!(to_stat_value(def, &"N/A".into()).unwrap(), StatValue::Number(0.0));
        assert_eq!(to_stat_value(def, &"".into()).unwrap(), StatValue::Number(0.0));
        assert_eq!(
            to_stat_value(def, &RawValue::Number(f64::NAN)).unwrap(),
            StatValue::Number(0.0)
        );
        assert_eq!(to_stat_value(def, &"12".into()).unwrap(), StatValue::Number(12.0));
        assert_eq!(lookup_value(def, &[]).unwrap(), StatValue::Number(0.0));
    }

    #[test]
    fn test_numeric_rejects_text_and_negatives() {
        let registry = StatRegistry::builtin().unwrap();
        let def = registry.get("G").unwrap();
        assert!(matches!(
            to_stat_value(def, &"Midfielder".into()),
            Err(QueryError::TypeMismatch { .. })
        ));
        assert!(matches!(
            to_stat_value(def, &RawValue::Number(-1.0)),
            Err(QueryError::NegativeValue { .. })
        ));
    }

    #[test]
    fn test_labels_are_canonicalised() {
        let registry = StatRegistry::builtin().unwrap();
        let def = registry.get("MostCommonPosition").unwrap();
        assert_eq!(
            to_stat_value(def, &"DEF".into()).unwrap(),
            StatValue::Label("Defender".into())
        );
        assert_eq!(to_stat_value(def, &RawValue::Null).unwrap(), StatValue::Missing);
        assert_eq!(lookup_value(def, &[]).unwrap(), StatValue::Missing);
        assert!(to_stat_value(def, &RawValue::Number(2.0)).is_err());
    }

    #[test]
    fn test_ranking_order_and_ties() {
        let registry = StatRegistry::builtin().unwrap();
        let def = registry.get("G").unwrap();
        let rows = vec![
            row("Sam Tuck", RawValue::Number(10.0)),
            row("Luke Bangs", RawValue::Number(25.0)),
            row("Oli Goddard", RawValue::Number(10.0)),
            row("Kieran Mackrell", RawValue::Null),
        ];
        let top = ranked_entries(def, &rows, RankDirection::Descending, 3).unwrap();
        let names: Vec<_> = top.iter().map(|e| e.player.as_str()).collect();
        assert_eq!(names, vec!["Luke Bangs", "Oli Goddard", "Sam Tuck"]);

        let bottom = ranked_entries(def, &rows, RankDirection::Ascending, 1).unwrap();
        assert_eq!(bottom[0].player, "Oli Goddard");
    }
}
