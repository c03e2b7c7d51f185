//! Value formatting and filter clauses.

use statchat_core::{Filters, StatValue};
use statchat_registry::StatDefinition;

/// Display form of a value: exact decimal places for numbers, the
/// canonical label otherwise. `None` for a missing label.
pub fn format_value(def: &StatDefinition, value: &StatValue) -> Option<String> {
    match value {
        StatValue::Number(n) => Some(def.format_number(*n)),
        StatValue::Label(label) => Some(label.clone()),
        StatValue::Missing => None,
    }
}

/// Filters an answer should mention. A team-specific metric's own team
/// counts even though the question's team filter was consumed by it.
pub fn effective_filters(def: &StatDefinition, filters: &Filters) -> Filters {
    Filters {
        team: filters.team.or(def.team),
        ..*filters
    }
}

/// " for the 3rd XI in the 2019/20 season as a defender", or "".
pub fn filter_clause(filters: &Filters) -> String {
    let mut clause = String::new();
    if let Some(team) = filters.team {
        clause.push_str(&format!(" for the {}", team.display_name()));
    }
    if let Some(season) = filters.season {
        clause.push_str(&format!(" in the {} season", season));
    }
    if let Some(position) = filters.position {
        clause.push_str(&format!(
            " as a {}",
            position.display_name().to_lowercase()
        ));
    }
    clause
}

#[cfg(test)]
mod tests {
    use super::*;
    use statchat_core::{Position, Season, TeamCode};
    use statchat_registry::StatRegistry;

    #[test]
    fn test_decimal_places_are_exact() {
        let registry = StatRegistry::builtin().unwrap();
        let rate = registry.get("GperAPP").unwrap();
        assert_eq!(format_value(rate, &StatValue::Number(0.5)).unwrap(), "0.50");
        assert_eq!(format_value(rate, &StatValue::Number(1.0 / 3.0)).unwrap(), "0.33");
        let goals = registry.get("G").unwrap();
        assert_eq!(format_value(goals, &StatValue::Number(25.0)).unwrap(), "25");
        assert_eq!(format_value(goals, &StatValue::Missing), None);
    }

    #[test]
    fn test_clause() {
        let filters = Filters {
            team: TeamCode::new(3),
            season: Season::new(2019),
            position: Some(Position::Defender),
        };
        assert_eq!(
            filter_clause(&filters),
            " for the 3rd XI in the 2019/20 season as a defender"
        );
        assert_eq!(filter_clause(&Filters::default()), "");
    }

    #[test]
    fn test_team_specific_metric_names_its_team() {
        let registry = StatRegistry::builtin().unwrap();
        let def = registry.get("3sGoals").unwrap();
        let filters = effective_filters(def, &Filters::default());
        assert_eq!(filter_clause(&filters), " for the 3rd XI");
    }
}
