//! Catalog-wide answer properties.

use statchat_core::{Filters, StatValue};
use statchat_out::quality::{all_passed, check_answer};
use statchat_out::{AnswerComposer, AnswerRenderer};
use statchat_registry::{LabelKind, StatRegistry, ValueShape, ZeroPhraseTable};
use std::sync::Arc;

fn setup() -> (StatRegistry, Arc<ZeroPhraseTable>, AnswerComposer) {
    let registry = StatRegistry::builtin().unwrap();
    let zero = Arc::new(ZeroPhraseTable::builtin().unwrap());
    let composer = AnswerComposer::new(Arc::new(AnswerRenderer::builtin().unwrap()), zero.clone());
    (registry, zero, composer)
}

fn sample_value(shape: ValueShape, label: Option<LabelKind>) -> StatValue {
    match (shape, label) {
        (ValueShape::Count, _) => StatValue::Number(7.0),
        (ValueShape::Decimal, _) => StatValue::Number(1.75),
        (ValueShape::Percentage, _) => StatValue::Number(62.5),
        (ValueShape::Label, Some(LabelKind::Team)) => StatValue::Label("3rd XI".into()),
        (ValueShape::Label, Some(LabelKind::Season)) => StatValue::Label("2019/20".into()),
        (ValueShape::Label, _) => StatValue::Label("Defender".into()),
    }
}

// ============================================================================
// Lookup answers
// ============================================================================

#[test]
fn test_lookup_answers_carry_subject_and_extractable_value() {
    let (registry, _, composer) = setup();
    for def in registry.iter() {
        let value = sample_value(def.shape, def.label);
        let text = composer
            .lookup(def, "Luke Bangs", &value, &Filters::default(), false)
            .unwrap();
        assert!(text.contains("Luke Bangs"), "{}: {}", def.key, text);

        let expected = match &value {
            StatValue::Number(n) => {
                let shown = def.format_number(*n);
                StatValue::Number(shown.trim_end_matches('%').parse().unwrap())
            }
            other => other.clone(),
        };
        assert_eq!(def.extract_value(&text), Some(expected), "{}: {}", def.key, text);
        assert!(
            all_passed(&check_answer(&text, &["Luke Bangs".to_string()])),
            "{}: {}",
            def.key,
            text
        );
    }
}

#[test]
fn test_zero_answers_use_the_metric_phrase() {
    let (registry, zero, composer) = setup();
    for def in registry.iter().filter(|d| d.is_numeric()) {
        let text = composer
            .lookup(def, "Sam Tuck", &StatValue::Number(0.0), &Filters::default(), false)
            .unwrap();
        assert!(zero.is_valid_zero_answer(def, &text, false), "{}: {}", def.key, text);

        let own_rule = zero.rule_for(def).unwrap();
        if own_rule.name != "appearances" {
            assert!(!zero.generic().accepts(&text), "{}: {}", def.key, text);
        }
    }
}

#[test]
fn test_generic_zero_only_with_no_appearances() {
    let (registry, zero, composer) = setup();
    for def in registry.iter().filter(|d| d.per_appearance) {
        let text = composer
            .lookup(def, "Sam Tuck", &StatValue::Number(0.0), &Filters::default(), true)
            .unwrap();
        assert!(zero.generic().accepts(&text), "{}: {}", def.key, text);
        assert!(zero.is_valid_zero_answer(def, &text, true));
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_rendering_is_deterministic() {
    let (registry, _, composer) = setup();
    let def = registry.get("GperAPP").unwrap();
    let first = composer
        .lookup(def, "Luke Bangs", &StatValue::Number(0.4567), &Filters::default(), false)
        .unwrap();
    let second = composer
        .lookup(def, "Luke Bangs", &StatValue::Number(0.4567), &Filters::default(), false)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "Luke Bangs has averaged 0.46 goals per appearance.");
}
