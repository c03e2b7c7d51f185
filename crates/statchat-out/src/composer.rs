//! Answer composition for lookups, comparisons and rankings.

use crate::formatter::{effective_filters, filter_clause};
use crate::renderer::AnswerRenderer;
use crate::RenderError;
use serde_json::json;
use statchat_core::{Filters, RankDirection, StatValue};
use statchat_query::RankedEntry;
use statchat_registry::{StatDefinition, ValueShape, ZeroPhraseTable};
use std::sync::Arc;

/// One subject's value in a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparedValue {
    pub subject: String,
    pub value: StatValue,
}

/// Builds answer sentences from catalog entries and checked values.
#[derive(Debug, Clone)]
pub struct AnswerComposer {
    renderer: Arc<AnswerRenderer>,
    zero_phrases: Arc<ZeroPhraseTable>,
}

impl AnswerComposer {
    pub fn new(renderer: Arc<AnswerRenderer>, zero_phrases: Arc<ZeroPhraseTable>) -> Self {
        Self {
            renderer,
            zero_phrases,
        }
    }

    pub fn renderer(&self) -> &AnswerRenderer {
        &self.renderer
    }

    pub fn zero_phrases(&self) -> &ZeroPhraseTable {
        &self.zero_phrases
    }

    /// "{Subject} has {verb} {value} {noun}{clause}." or the metric's zero
    /// phrase. The generic no-appearance phrase is only used for
    /// per-appearance metrics when `appearances_known_zero` is set.
    pub fn lookup(
        &self,
        def: &StatDefinition,
        subject: &str,
        value: &StatValue,
        filters: &Filters,
        appearances_known_zero: bool,
    ) -> Result<String, RenderError> {
        let clause = filter_clause(&effective_filters(def, filters));
        self.value_sentence(def, subject, value, &clause, appearances_known_zero)
    }

    fn value_sentence(
        &self,
        def: &StatDefinition,
        subject: &str,
        value: &StatValue,
        clause: &str,
        appearances_known_zero: bool,
    ) -> Result<String, RenderError> {
        match value {
            StatValue::Number(n) => {
                if *n == 0.0 {
                    if let Some(phrase) = self.zero_phrases.phrase_for(def, appearances_known_zero) {
                        return self.renderer.render(
                            "lookup_zero",
                            &json!({ "subject": subject, "phrase": phrase, "clause": clause }),
                        );
                    }
                }
                self.renderer.render(
                    "lookup",
                    &json!({
                        "subject": subject,
                        "verb": def.verb,
                        "value": def.format_number(*n),
                        "noun": def.noun_for(*n),
                        "clause": clause,
                    }),
                )
            }
            StatValue::Label(label) => self.renderer.render(
                "lookup_label",
                &json!({
                    "subject": subject,
                    "metric": def.metric,
                    "value": label,
                    "clause": clause,
                }),
            ),
            StatValue::Missing => self.renderer.render(
                "lookup_label_missing",
                &json!({ "subject": subject, "metric": def.metric, "clause": clause }),
            ),
        }
    }

    /// Every subject's value, then who leads. Ascending comparisons
    /// ("fewer", "worse") are led by the lowest value.
    pub fn comparison(
        &self,
        def: &StatDefinition,
        values: &[ComparedValue],
        filters: &Filters,
        direction: RankDirection,
    ) -> Result<String, RenderError> {
        let mut numbers = Vec::with_capacity(values.len());
        for compared in values {
            let Some(n) = compared.value.as_number() else {
                return Err(RenderError::Render(format!(
                    "cannot compare non-numeric '{}'",
                    def.key
                )));
            };
            numbers.push(n);
        }

        let mut parts = Vec::with_capacity(values.len());
        for compared in values {
            let sentence = self.value_sentence(def, &compared.subject, &compared.value, "", false)?;
            parts.push(sentence.trim_end_matches('.').to_string());
        }
        let clause = filter_clause(&effective_filters(def, filters));

        let best = match direction {
            RankDirection::Descending => numbers.iter().cloned().fold(f64::MIN, f64::max),
            RankDirection::Ascending => numbers.iter().cloned().fold(f64::MAX, f64::min),
        };
        let leaders: Vec<&str> = values
            .iter()
            .zip(&numbers)
            .filter(|(_, n)| **n == best)
            .map(|(c, _)| c.subject.as_str())
            .collect();

        if leaders.len() == values.len() {
            return self.renderer.render(
                "comparison_level",
                &json!({
                    "parts": parts,
                    "clause": clause,
                    "pair": values.len() == 2,
                    "comparative": comparative(def, RankDirection::Descending),
                }),
            );
        }
        self.renderer.render(
            "comparison",
            &json!({
                "parts": parts,
                "clause": clause,
                "leaders": leaders,
                "shared": leaders.len() > 1,
                "comparative": comparative(def, direction),
            }),
        )
    }

    /// Ordered entries with their values, e.g.
    /// "The top 3 players by goals are A (25), B (20) and C (18)."
    pub fn ranking(
        &self,
        def: &StatDefinition,
        entries: &[RankedEntry],
        filters: &Filters,
        direction: RankDirection,
    ) -> Result<String, RenderError> {
        let clause = filter_clause(&effective_filters(def, filters));
        let ascending = direction == RankDirection::Ascending;
        let listed: Vec<String> = entries
            .iter()
            .map(|e| format!("{} ({})", e.player, def.format_number(e.value)))
            .collect();

        match listed.as_slice() {
            [] => self.renderer.render(
                "ranking_empty",
                &json!({ "metric": def.metric, "clause": clause }),
            ),
            [entry] => self.renderer.render(
                "ranking_single",
                &json!({
                    "metric": def.metric,
                    "clause": clause,
                    "ascending": ascending,
                    "entry": entry,
                }),
            ),
            _ => self.renderer.render(
                "ranking",
                &json!({
                    "metric": def.metric,
                    "clause": clause,
                    "ascending": ascending,
                    "count": listed.len(),
                    "entries": listed,
                }),
            ),
        }
    }

    /// Sentence naming players that could not be found.
    pub fn unresolved_note(&self, names: &[String]) -> Result<String, RenderError> {
        self.renderer.render(
            "unresolved_note",
            &json!({ "names": names, "single": names.len() == 1 }),
        )
    }
}

/// "more goals", "fewer yellow cards", "a higher win percentage".
fn comparative(def: &StatDefinition, direction: RankDirection) -> String {
    let descending = direction == RankDirection::Descending;
    match def.shape {
        ValueShape::Count => {
            let word = if descending { "more" } else { "fewer" };
            format!("{} {}", word, def.noun.plural)
        }
        _ => {
            let word = if descending { "a higher" } else { "a lower" };
            format!("{} {}", word, def.metric)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statchat_core::TeamCode;
    use statchat_registry::StatRegistry;

    fn composer() -> AnswerComposer {
        AnswerComposer::new(
            Arc::new(AnswerRenderer::builtin().unwrap()),
            Arc::new(ZeroPhraseTable::builtin().unwrap()),
        )
    }

    fn compared(subject: &str, n: f64) -> ComparedValue {
        ComparedValue {
            subject: subject.to_string(),
            value: StatValue::Number(n),
        }
    }

    #[test]
    fn test_lookup_sentences() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let goals = registry.get("G").unwrap();
        let text = composer
            .lookup(goals, "Luke Bangs", &StatValue::Number(1.0), &Filters::default(), false)
            .unwrap();
        assert_eq!(text, "Luke Bangs has scored 1 goal.");

        let filters = Filters {
            team: TeamCode::new(3),
            ..Default::default()
        };
        let text = composer
            .lookup(goals, "Luke Bangs", &StatValue::Number(0.0), &filters, false)
            .unwrap();
        assert_eq!(text, "Luke Bangs has not scored any goals for the 3rd XI.");
    }

    #[test]
    fn test_per_appearance_zero() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let rate = registry.get("GperAPP").unwrap();
        let specific = composer
            .lookup(rate, "Sam Tuck", &StatValue::Number(0.0), &Filters::default(), false)
            .unwrap();
        assert_eq!(specific, "Sam Tuck has not scored any goals.");
        let generic = composer
            .lookup(rate, "Sam Tuck", &StatValue::Number(0.0), &Filters::default(), true)
            .unwrap();
        assert_eq!(generic, "Sam Tuck has not made an appearance yet.");
    }

    #[test]
    fn test_label_lookup() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let def = registry.get("MostCommonPosition").unwrap();
        let text = composer
            .lookup(def, "Oli Goddard", &StatValue::Label("Defender".into()), &Filters::default(), false)
            .unwrap();
        assert_eq!(text, "Oli Goddard's most common position is Defender.");
        let text = composer
            .lookup(def, "Luke Bangs", &StatValue::Missing, &Filters::default(), false)
            .unwrap();
        assert_eq!(text, "Luke Bangs' most common position has not been recorded yet.");
    }

    #[test]
    fn test_comparison() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let goals = registry.get("G").unwrap();
        let text = composer
            .comparison(
                goals,
                &[compared("Luke Bangs", 25.0), compared("Oli Goddard", 12.0)],
                &Filters::default(),
                RankDirection::Descending,
            )
            .unwrap();
        assert_eq!(
            text,
            "Luke Bangs has scored 25 goals and Oli Goddard has scored 12 goals, so Luke Bangs has more goals."
        );

        let text = composer
            .comparison(
                goals,
                &[compared("Luke Bangs", 25.0), compared("Oli Goddard", 12.0)],
                &Filters::default(),
                RankDirection::Ascending,
            )
            .unwrap();
        assert!(text.ends_with("so Oli Goddard has fewer goals."));
    }

    #[test]
    fn test_comparison_level_and_zero() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let goals = registry.get("G").unwrap();
        let text = composer
            .comparison(
                goals,
                &[compared("Luke Bangs", 0.0), compared("Oli Goddard", 0.0)],
                &Filters::default(),
                RankDirection::Descending,
            )
            .unwrap();
        assert_eq!(
            text,
            "Luke Bangs has not scored any goals and Oli Goddard has not scored any goals, so neither player has more goals than the other."
        );
    }

    #[test]
    fn test_rate_comparison_uses_higher() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let rate = registry.get("GperAPP").unwrap();
        let text = composer
            .comparison(
                rate,
                &[compared("Luke Bangs", 0.5), compared("Oli Goddard", 0.25)],
                &Filters::default(),
                RankDirection::Descending,
            )
            .unwrap();
        assert!(text.contains("0.50"));
        assert!(text.ends_with("so Luke Bangs has a higher goals per appearance."));
    }

    #[test]
    fn test_ranking() {
        let registry = StatRegistry::builtin().unwrap();
        let composer = composer();
        let goals = registry.get("G").unwrap();
        let entries = vec![
            RankedEntry { player: "Luke Bangs".into(), value: 25.0 },
            RankedEntry { player: "Oli Goddard".into(), value: 12.0 },
            RankedEntry { player: "Sam Tuck".into(), value: 12.0 },
        ];
        let text = composer
            .ranking(goals, &entries, &Filters::default(), RankDirection::Descending)
            .unwrap();
        assert_eq!(
            text,
            "The top 3 players by goals are Luke Bangs (25), Oli Goddard (12) and Sam Tuck (12)."
        );
        let text = composer
            .ranking(goals, &entries[..1], &Filters::default(), RankDirection::Ascending)
            .unwrap();
        assert_eq!(text, "The lowest-ranked player by goals is Luke Bangs (25).");
        let text = composer
            .ranking(goals, &[], &Filters::default(), RankDirection::Descending)
            .unwrap();
        assert_eq!(text, "There are no goals recorded to rank players by yet.");
    }

    #[test]
    fn test_unresolved_note() {
        let text = composer().unresolved_note(&["John Smith".to_string()]).unwrap();
        assert_eq!(
            text,
            "I couldn't find a player called John Smith, so I've left them out."
        );
    }
}
