//! Cypher generation.
//!
//! Queries are built from the catalog's value expression plus the effective
//! filters. Player names, filter values and limits are always bound as
//! parameters; only catalog text is spliced into the statement.

use crate::error::QueryError;
use serde_json::{json, Value};
use statchat_core::{Filters, GeneratedQuery, QueryKind, RankDirection};
use statchat_registry::{StatDefinition, ValueQuery};
use std::collections::BTreeMap;

const PLAYER_MATCH: &str = "MATCH (p:Player {playerName: $playerName})-[:PLAYED_IN]->(md:MatchDetail)";
const ALL_PLAYERS_MATCH: &str = "MATCH (p:Player)-[:PLAYED_IN]->(md:MatchDetail)";

/// Nulls sort first under DESC and rate expressions yield NaN or Infinity
/// on a zero denominator; both must go before the limit applies.
const RANKABLE_VALUE: &str = "WHERE value IS NOT NULL AND value = value AND abs(value) < 1.0e308";

/// Reject filters the metric cannot honour.
pub fn check_filters(def: &StatDefinition, filters: &Filters) -> Result<(), QueryError> {
    let rejected: Vec<_> = filters
        .kinds()
        .into_iter()
        .filter(|kind| !def.allows(*kind))
        .collect();
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(QueryError::FilterConflict {
            key: def.key.clone(),
            kinds: rejected,
        })
    }
}

/// Value of one metric for one player.
pub fn build_lookup(
    def: &StatDefinition,
    subject: &str,
    filters: &Filters,
) -> Result<GeneratedQuery, QueryError> {
    check_filters(def, filters)?;
    let mut params = BTreeMap::new();
    params.insert("playerName".to_string(), json!(subject));
    let conditions = bind_filters(def, filters, &mut params);

    let mut cypher = String::from(PLAYER_MATCH);
    push_where(&mut cypher, &conditions);
    match &def.query {
        ValueQuery::Aggregate { expression } => {
            cypher.push_str(&format!(
                "\nRETURN p.playerName AS playerName, {} AS value",
                expression
            ));
        }
        ValueQuery::ModeOf { field, weight } => {
            cypher.push_str(&format!(
                "\nWITH p, {} AS label, {} AS weight\nWHERE weight > 0\nORDER BY weight DESC, label ASC\nRETURN p.playerName AS playerName, head(collect(label)) AS value",
                field, weight
            ));
        }
    }

    Ok(GeneratedQuery {
        kind: QueryKind::Lookup,
        metric_key: def.key.clone(),
        subject: Some(subject.to_string()),
        filters: *filters,
        direction: None,
        cypher,
        params,
    })
}

/// Every player's value, ordered, limited to `limit` rows.
pub fn build_ranking(
    def: &StatDefinition,
    filters: &Filters,
    limit: u32,
    direction: RankDirection,
) -> Result<GeneratedQuery, QueryError> {
    check_filters(def, filters)?;
    let ValueQuery::Aggregate { expression } = &def.query else {
        return Err(QueryError::NotOrderable(def.key.clone()));
    };
    if !def.is_numeric() {
        return Err(QueryError::NotOrderable(def.key.clone()));
    }

    let mut params = BTreeMap::new();
    params.insert("limit".to_string(), json!(limit));
    let conditions = bind_filters(def, filters, &mut params);

    let order = match direction {
        RankDirection::Ascending => "ASC",
        RankDirection::Descending => "DESC",
    };
    let mut cypher = String::from(ALL_PLAYERS_MATCH);
    push_where(&mut cypher, &conditions);
    cypher.push_str(&format!(
        "\nWITH p.playerName AS playerName, {} AS value\n{}\nRETURN playerName, value\nORDER BY value {}, playerName ASC\nLIMIT $limit",
        expression, RANKABLE_VALUE, order
    ));

    Ok(GeneratedQuery {
        kind: QueryKind::Ranking,
        metric_key: def.key.clone(),
        subject: None,
        filters: *filters,
        direction: Some(direction),
        cypher,
        params,
    })
}

/// Appearance count under the same filters, used to pick a zero phrase.
/// `appearances` is the catalog's appearance metric; a team-specific
/// metric's team carries over as a team filter.
pub fn build_appearance_check(
    appearances: &StatDefinition,
    original: &StatDefinition,
    subject: &str,
    filters: &Filters,
) -> Result<GeneratedQuery, QueryError> {
    let mut effective = *filters;
    if effective.team.is_none() {
        effective.team = original.team;
    }
    let mut query = build_lookup(appearances, subject, &effective)?;
    query.kind = QueryKind::AppearanceCheck;
    Ok(query)
}

fn bind_filters(
    def: &StatDefinition,
    filters: &Filters,
    params: &mut BTreeMap<String, Value>,
) -> Vec<&'static str> {
    let mut conditions = Vec::new();
    if let Some(team) = def.team.or(filters.team) {
        params.insert("team".to_string(), json!(team.code()));
        conditions.push("md.team = $team");
    }
    if let Some(season) = filters.season {
        params.insert("season".to_string(), json!(season.to_string()));
        conditions.push("md.season = $season");
    }
    if let Some(position) = filters.position {
        params.insert("position".to_string(), json!(position.code()));
        conditions.push("md.position = $position");
    }
    conditions
}

fn push_where(cypher: &mut String, conditions: &[&str]) {
    if !conditions.is_empty() {
        cypher.push_str("\nWHERE ");
        cypher.push_str(&conditions.join(" AND "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statchat_core::{FilterKind, Position, Season, TeamCode};
    use statchat_registry::StatRegistry;

    fn registry() -> StatRegistry {
        StatRegistry::builtin().unwrap()
    }

    #[test]
    fn test_lookup_binds_player_as_parameter() {
        let registry = registry();
        let def = registry.get("G").unwrap();
        let query = build_lookup(def, "O'Neil \"Bobby\"", &Filters::default()).unwrap();
        assert!(!query.cypher.contains("O'Neil"));
        assert_eq!(query.params["playerName"], json!("O'Neil \"Bobby\""));
        assert!(query.cypher.contains("sum(md.goals) AS value"));
        assert!(!query.cypher.contains("WHERE"));
    }

    #[test]
    fn test_filters_become_conditions() {
        let registry = registry();
        let def = registry.get("MIN").unwrap();
        let filters = Filters {
            team: TeamCode::new(2),
            season: Season::new(2019),
            position: Some(Position::Goalkeeper),
        };
        let query = build_lookup(def, "Luke Bangs", &filters).unwrap();
        assert!(query
            .cypher
            .contains("WHERE md.team = $team AND md.season = $season AND md.position = $position"));
        assert_eq!(query.params["team"], json!("2s"));
        assert_eq!(query.params["season"], json!("2019/20"));
        assert_eq!(query.params["position"], json!("GK"));
        assert_eq!(query.filters, filters);
    }

    #[test]
    fn test_team_specific_metric_binds_its_team() {
        let registry = registry();
        let def = registry.get("3sGoals").unwrap();
        let query = build_lookup(def, "Luke Bangs", &Filters::default()).unwrap();
        assert_eq!(query.params["team"], json!("3s"));
    }

    #[test]
    fn test_filter_conflict() {
        let registry = registry();
        let def = registry.get("3sGoals").unwrap();
        let filters = Filters {
            team: TeamCode::new(2),
            ..Default::default()
        };
        match build_lookup(def, "Luke Bangs", &filters) {
            Err(QueryError::FilterConflict { key, kinds }) => {
                assert_eq!(key, "3sGoals");
                assert_eq!(kinds, vec![FilterKind::Team]);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_mode_lookup_orders_by_weight() {
        let registry = registry();
        let def = registry.get("MostCommonPosition").unwrap();
        let query = build_lookup(def, "Luke Bangs", &Filters::default()).unwrap();
        assert!(query.cypher.contains("md.position AS label"));
        assert!(query.cypher.contains("ORDER BY weight DESC, label ASC"));
    }

    #[test]
    fn test_ranking() {
        let registry = registry();
        let def = registry.get("G").unwrap();
        let query = build_ranking(def, &Filters::default(), 3, RankDirection::Descending).unwrap();
        assert_eq!(query.kind, QueryKind::Ranking);
        assert_eq!(query.params["limit"], json!(3));
        assert!(query.cypher.contains("ORDER BY value DESC, playerName ASC"));
        assert!(query.subject.is_none());
        assert_eq!(query.direction, Some(RankDirection::Descending));

        let asc = build_ranking(def, &Filters::default(), 1, RankDirection::Ascending).unwrap();
        assert!(asc.cypher.contains("ORDER BY value ASC"));
    }

    #[test]
    fn test_ranking_drops_unusable_values_before_limit() {
        let registry = registry();
        let def = registry.get("MperG").unwrap();
        let query = build_ranking(def, &Filters::default(), 3, RankDirection::Descending).unwrap();
        let guard = query.cypher.find(RANKABLE_VALUE).unwrap();
        let limit = query.cypher.find("LIMIT $limit").unwrap();
        assert!(guard < query.cypher.find("ORDER BY").unwrap());
        assert!(guard < limit);
    }

    #[test]
    fn test_label_metrics_cannot_rank() {
        let registry = registry();
        let def = registry.get("MostCommonPosition").unwrap();
        assert!(matches!(
            build_ranking(def, &Filters::default(), 1, RankDirection::Descending),
            Err(QueryError::NotOrderable(_))
        ));
    }

    #[test]
    fn test_appearance_check_keeps_team() {
        let registry = registry();
        let apps = registry.get("APP").unwrap();
        let goals = registry.get("3sGoals").unwrap();
        let query = build_appearance_check(apps, goals, "Luke Bangs", &Filters::default()).unwrap();
        assert_eq!(query.kind, QueryKind::AppearanceCheck);
        assert_eq!(query.metric_key, "APP");
        assert_eq!(query.params["team"], json!("3s"));
        assert_eq!(query.filters.team, TeamCode::new(3));
    }
}
