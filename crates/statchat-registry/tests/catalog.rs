use statchat_core::{FilterKind, StatValue, TeamCode};
use statchat_registry::{
    Category, LabelKind, StatRegistry, ValueQuery, ValueShape, ZeroPhraseTable,
    BUILTIN_STAT_COUNT,
};
use std::collections::HashSet;

fn catalog() -> (StatRegistry, ZeroPhraseTable) {
    let registry = StatRegistry::builtin().expect("builtin catalog");
    let zeros = ZeroPhraseTable::builtin().expect("builtin zero phrases");
    (registry, zeros)
}

#[test]
fn test_builtin_has_seventy_unique_keys() {
    let (registry, _) = catalog();
    assert_eq!(registry.len(), BUILTIN_STAT_COUNT);
    let keys: HashSet<_> = registry.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys.len(), BUILTIN_STAT_COUNT);
}

#[test]
fn test_category_sizes() {
    let (registry, _) = catalog();
    let count = |c| registry.by_category(c).count();
    assert_eq!(count(Category::Basic), 17);
    assert_eq!(count(Category::Advanced), 13);
    assert_eq!(count(Category::HomeAway), 8);
    assert_eq!(count(Category::TeamSpecific), 19);
    assert_eq!(count(Category::Seasonal), 8);
    assert_eq!(count(Category::Positional), 5);
}

#[test]
fn test_every_numeric_metric_has_zero_rule() {
    let (registry, zeros) = catalog();
    zeros.validate_against(&registry).unwrap();
}

#[test]
fn test_templates_mention_player() {
    let (registry, _) = catalog();
    for def in registry.iter() {
        let question = def.question_for("Luke Bangs");
        assert!(question.contains("Luke Bangs"), "{}", def.key);
        assert!(question.ends_with('?'), "{}", def.key);
    }
}

#[test]
fn test_team_specialisations_cover_all_teams() {
    let (registry, _) = catalog();
    for n in 1..=8 {
        let team = TeamCode::new(n).unwrap();
        let apps = registry.specialise("APP", team).unwrap();
        assert_eq!(apps.key, format!("{}sApps", n));
        assert_eq!(apps.verb, "made");
        let goals = registry.specialise("G", team).unwrap();
        assert_eq!(goals.key, format!("{}sGoals", n));
        assert!(!goals.allows(FilterKind::Team));
    }
    assert!(registry.specialise("A", TeamCode::new(1).unwrap()).is_none());
}

#[test]
fn test_shapes_and_decimals() {
    let (registry, _) = catalog();
    let goals = registry.get("G").unwrap();
    assert_eq!(goals.shape, ValueShape::Count);
    assert_eq!(goals.format_number(12.0), "12");

    let rate = registry.get("GperAPP").unwrap();
    assert_eq!(rate.decimal_places, 2);
    assert_eq!(rate.format_number(0.456), "0.46");

    let pct = registry.get("Games%Won").unwrap();
    assert_eq!(pct.format_number(55.0), "55.0%");

    let position = registry.get("MostCommonPosition").unwrap();
    assert_eq!(position.label, Some(LabelKind::Position));
    assert!(position.superlative);
    assert!(matches!(position.query, ValueQuery::ModeOf { .. }));
}

#[test]
fn test_extract_value_from_answers() {
    let (registry, _) = catalog();
    let cases = [
        ("G", "Luke Bangs has scored 12 goals.", StatValue::Number(12.0)),
        (
            "GperAPP",
            "Luke Bangs has averaged 0.45 goals per appearance.",
            StatValue::Number(0.45),
        ),
        ("DIST", "Luke Bangs has travelled 312.5 miles to games.", StatValue::Number(312.5)),
        ("Pen%Conv", "Luke Bangs has converted 75.0% of penalties taken.", StatValue::Number(75.0)),
        (
            "3sGoals",
            "Luke Bangs has scored 4 goals for the 3rd XI.",
            StatValue::Number(4.0),
        ),
        (
            "FirstSeason",
            "Luke Bangs' debut season is 2016/17.",
            StatValue::Label("2016/17".to_string()),
        ),
        (
            "MostCommonPosition",
            "Luke Bangs' most common position is Midfielder.",
            StatValue::Label("Midfielder".to_string()),
        ),
    ];
    for (key, answer, expected) in cases {
        let def = registry.get(key).unwrap();
        assert_eq!(def.extract_value(answer), Some(expected), "{}", key);
    }
}

#[test]
fn test_zero_answers() {
    let (registry, zeros) = catalog();
    let goals = registry.get("G").unwrap();
    assert!(zeros.is_valid_zero_answer(goals, "Luke Bangs has not scored any goals.", false));
    assert!(!zeros.is_valid_zero_answer(goals, "Luke Bangs has scored 0 goals.", false));

    let team_goals = registry.get("3sGoals").unwrap();
    assert_eq!(zeros.phrase_for(team_goals, false), Some("has not scored any goals"));

    let keeper = registry.get("GK").unwrap();
    assert!(zeros.is_valid_zero_answer(keeper, "Luke Bangs has never played as a goalkeeper.", false));

    let rate = registry.get("GperAPP").unwrap();
    assert_eq!(zeros.phrase_for(rate, true), Some("has not made an appearance yet"));
    assert_eq!(zeros.phrase_for(rate, false), Some("has not scored any goals"));
    assert!(zeros.is_valid_zero_answer(rate, "Luke Bangs has not made an appearance yet.", true));
    assert!(!zeros.is_valid_zero_answer(rate, "Luke Bangs has not made an appearance yet.", false));

    let pens = registry.get("PSC").unwrap();
    assert!(zeros.is_valid_zero_answer(pens, "Luke Bangs has not converted a penalty.", false));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let err = StatRegistry::load("/nonexistent/stats.yaml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/stats.yaml"));
}
