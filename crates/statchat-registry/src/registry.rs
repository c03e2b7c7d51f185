//! Catalog loading, validation and lookup.

use crate::definition::{
    AliasPattern, Category, ExtractionPattern, LabelKind, NounForms, StatDefinition, ValueQuery,
    ValueShape,
};
use crate::error::RegistryError;
use serde::Deserialize;
use statchat_core::{FilterKind, TeamCode};
use std::collections::HashMap;
use tracing::debug;

/// Number of metrics the builtin catalog must hold.
pub const BUILTIN_STAT_COUNT: usize = 70;

const BUILTIN_CATALOG: &str = include_str!("../data/stat-definitions.yaml");

/// Top-level catalog file structure
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    pub version: String,
    pub stats: Vec<StatSpec>,
}

/// One catalog entry as written in YAML
#[derive(Debug, Clone, Deserialize)]
pub struct StatSpec {
    pub key: String,
    pub metric: String,
    pub category: Category,
    pub shape: ValueShape,
    #[serde(default)]
    pub decimal_places: u8,
    #[serde(default)]
    pub label: Option<LabelKind>,
    #[serde(default)]
    pub verb: Option<String>,
    #[serde(default)]
    pub noun: Option<NounForms>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub question_template: String,
    #[serde(default)]
    pub filters: Vec<FilterKind>,
    #[serde(default)]
    pub per_appearance: bool,
    #[serde(default)]
    pub superlative: bool,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub team: Option<TeamCode>,
    #[serde(default)]
    pub query: Option<QuerySpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySpec {
    #[serde(default)]
    pub aggregate: Option<String>,
    #[serde(default)]
    pub mode_of: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
}

/// The compiled, read-only statistic catalog.
#[derive(Debug, Clone)]
pub struct StatRegistry {
    version: String,
    definitions: Vec<StatDefinition>,
    index: HashMap<String, usize>,
    specialisations: HashMap<(String, TeamCode), usize>,
}

impl StatRegistry {
    /// The embedded catalog. Fails only if the embedded YAML is broken.
    pub fn builtin() -> Result<Self, RegistryError> {
        let registry = Self::from_yaml(BUILTIN_CATALOG)?;
        if registry.len() != BUILTIN_STAT_COUNT {
            return Err(RegistryError::CountMismatch {
                expected: BUILTIN_STAT_COUNT,
                found: registry.len(),
            });
        }
        Ok(registry)
    }

    /// Load and compile a catalog from a YAML file
    pub fn load(path: &str) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Compile a catalog from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;

        let mut index = HashMap::new();
        for (i, spec) in file.stats.iter().enumerate() {
            if index.insert(spec.key.clone(), i).is_some() {
                return Err(RegistryError::DuplicateKey(spec.key.clone()));
            }
        }

        let mut definitions = Vec::with_capacity(file.stats.len());
        let mut specialisations = HashMap::new();
        for spec in &file.stats {
            let base = match &spec.base {
                Some(base_key) => {
                    let base = index
                        .get(base_key)
                        .map(|&i| &file.stats[i])
                        .filter(|b| b.base.is_none())
                        .ok_or_else(|| RegistryError::UnknownBase {
                            key: spec.key.clone(),
                            base: base_key.clone(),
                        })?;
                    Some(base)
                }
                None => None,
            };

            let definition = compile_definition(spec, base)?;
            if let (Some(base_key), Some(team)) = (&definition.base, definition.team) {
                let slot = (base_key.clone(), team);
                if specialisations.insert(slot, definitions.len()).is_some() {
                    return Err(RegistryError::DuplicateSpecialisation {
                        base: base_key.clone(),
                        team,
                    });
                }
            }
            definitions.push(definition);
        }

        debug!(
            version = %file.version,
            stats = definitions.len(),
            "compiled stat catalog"
        );

        Ok(StatRegistry {
            version: file.version,
            definitions,
            index,
            specialisations,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, key: &str) -> Option<&StatDefinition> {
        self.index.get(key).map(|&i| &self.definitions[i])
    }

    /// Position of a key in catalog order; earlier entries win ties.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn definitions(&self) -> &[StatDefinition] {
        &self.definitions
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatDefinition> {
        self.definitions.iter()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &StatDefinition> {
        self.definitions
            .iter()
            .filter(move |d| d.category == category)
    }

    /// The team-specific variant of `base_key` for `team`, if the catalog has one.
    pub fn specialise(&self, base_key: &str, team: TeamCode) -> Option<&StatDefinition> {
        self.specialisations
            .get(&(base_key.to_string(), team))
            .map(|&i| &self.definitions[i])
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn compile_definition(
    spec: &StatSpec,
    base: Option<&StatSpec>,
) -> Result<StatDefinition, RegistryError> {
    let key = &spec.key;
    let invalid = |field: &'static str, reason: &str| RegistryError::Invalid {
        key: key.clone(),
        field,
        reason: reason.to_string(),
    };
    let missing = |field: &'static str| RegistryError::MissingField {
        key: key.clone(),
        field,
    };

    if spec.metric.trim().is_empty() {
        return Err(missing("metric"));
    }
    if !spec.question_template.contains("{player}") {
        return Err(invalid("question_template", "must contain {player}"));
    }
    if spec.base.is_some() != spec.team.is_some() {
        return Err(invalid("team", "base and team must be set together"));
    }
    if matches!(spec.shape, ValueShape::Count | ValueShape::Label) && spec.decimal_places != 0 {
        return Err(invalid("decimal_places", "counts and labels have no decimals"));
    }
    if spec.shape == ValueShape::Label && spec.label.is_none() {
        return Err(missing("label"));
    }
    if spec.shape != ValueShape::Label && spec.superlative {
        return Err(invalid("superlative", "only label metrics are superlative"));
    }

    let verb = spec
        .verb
        .clone()
        .or_else(|| base.and_then(|b| b.verb.clone()))
        .unwrap_or_default();
    if spec.shape.is_numeric() && verb.trim().is_empty() {
        return Err(missing("verb"));
    }
    let noun = spec
        .noun
        .clone()
        .or_else(|| base.and_then(|b| b.noun.clone()))
        .ok_or_else(|| missing("noun"))?;
    let query_spec = spec
        .query
        .as_ref()
        .or_else(|| base.and_then(|b| b.query.as_ref()))
        .ok_or_else(|| missing("query"))?;
    let query = match (&query_spec.aggregate, &query_spec.mode_of, &query_spec.weight) {
        (Some(expression), None, None) => ValueQuery::Aggregate {
            expression: expression.clone(),
        },
        (None, Some(field), Some(weight)) => ValueQuery::ModeOf {
            field: field.clone(),
            weight: weight.clone(),
        },
        _ => return Err(invalid("query", "expected aggregate, or mode_of with weight")),
    };

    let mut alias_patterns = Vec::with_capacity(spec.aliases.len() + 1);
    let phrases = std::iter::once((spec.metric.as_str(), true))
        .chain(spec.aliases.iter().map(|a| (a.as_str(), false)));
    for (phrase, canonical) in phrases {
        let pattern =
            AliasPattern::compile(phrase, canonical).map_err(|source| {
                RegistryError::InvalidPattern {
                    owner: key.clone(),
                    pattern: phrase.to_string(),
                    source,
                }
            })?;
        alias_patterns.push(pattern);
    }

    let extraction_pattern = ExtractionPattern::new(spec.shape, spec.decimal_places, spec.label)
        .map_err(|source| RegistryError::InvalidPattern {
            owner: key.clone(),
            pattern: "extraction".to_string(),
            source,
        })?;

    Ok(StatDefinition {
        key: key.clone(),
        metric: spec.metric.trim().to_lowercase(),
        aliases: spec.aliases.clone(),
        question_template: spec.question_template.clone(),
        decimal_places: spec.decimal_places,
        category: spec.category,
        shape: spec.shape,
        label: spec.label,
        verb,
        noun,
        filters: spec.filters.clone(),
        per_appearance: spec.per_appearance,
        superlative: spec.superlative,
        base: spec.base.clone(),
        team: spec.team,
        query,
        extraction_pattern,
        alias_patterns,
    })
}
