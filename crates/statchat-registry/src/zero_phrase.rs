//! Zero-value phrases.
//!
//! A zero is never stated as "0 goals". Each numeric metric maps to a rule
//! whose phrase replaces the verb phrase ("has not scored any goals"). Rules
//! bind to keys or to whole categories; team-specific entries share their
//! base key's rule. Per-appearance metrics fall back to the generic phrase
//! only when the player is known to have no appearances.

use crate::definition::{Category, StatDefinition};
use crate::error::RegistryError;
use crate::registry::StatRegistry;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

const BUILTIN_PHRASES: &str = include_str!("../data/zero-phrases.yaml");

#[derive(Debug, Clone, Deserialize)]
struct ZeroPhraseFile {
    version: String,
    generic: ZeroRuleSpec,
    rules: Vec<ZeroRuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct ZeroRuleSpec {
    name: String,
    phrase: String,
    #[serde(default)]
    accept: Vec<String>,
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Clone)]
pub struct ZeroRule {
    pub name: String,
    /// Verb phrase that follows the player's name
    pub phrase: String,
    accept: Vec<Regex>,
}

impl ZeroRule {
    fn compile(spec: &ZeroRuleSpec) -> Result<Self, RegistryError> {
        let literal = regex::escape(&spec.phrase);
        let accept = std::iter::once(literal.as_str())
            .chain(spec.accept.iter().map(String::as_str))
            .map(|pattern| {
                Regex::new(&format!("(?i){}", pattern)).map_err(|source| {
                    RegistryError::InvalidPattern {
                        owner: spec.name.clone(),
                        pattern: pattern.to_string(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ZeroRule {
            name: spec.name.clone(),
            phrase: spec.phrase.clone(),
            accept,
        })
    }

    pub fn accepts(&self, answer: &str) -> bool {
        self.accept.iter().any(|re| re.is_match(answer))
    }
}

#[derive(Debug, Clone)]
pub struct ZeroPhraseTable {
    version: String,
    generic: ZeroRule,
    rules: Vec<ZeroRule>,
    by_key: HashMap<String, usize>,
    by_category: HashMap<Category, usize>,
}

impl ZeroPhraseTable {
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(BUILTIN_PHRASES)
    }

    pub fn load(path: &str) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        let file: ZeroPhraseFile = serde_yaml::from_str(yaml)?;
        let generic = ZeroRule::compile(&file.generic)?;

        let mut rules = Vec::with_capacity(file.rules.len());
        let mut by_key = HashMap::new();
        let mut by_category = HashMap::new();
        for (i, spec) in file.rules.iter().enumerate() {
            rules.push(ZeroRule::compile(spec)?);
            for key in &spec.keys {
                if by_key.insert(key.clone(), i).is_some() {
                    return Err(RegistryError::DuplicateKey(key.clone()));
                }
            }
            for category in &spec.categories {
                if by_category.insert(*category, i).is_some() {
                    return Err(RegistryError::DuplicateKey(format!("{:?}", category)));
                }
            }
        }

        Ok(ZeroPhraseTable {
            version: file.version,
            generic,
            rules,
            by_key,
            by_category,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn generic(&self) -> &ZeroRule {
        &self.generic
    }

    /// Rule for a metric: its own key, then its base key, then its category.
    pub fn rule_for(&self, def: &StatDefinition) -> Option<&ZeroRule> {
        self.by_key
            .get(&def.key)
            .or_else(|| def.base.as_ref().and_then(|base| self.by_key.get(base)))
            .or_else(|| self.by_category.get(&def.category))
            .map(|&i| &self.rules[i])
    }

    /// The phrase an answer uses when `def` is zero.
    pub fn phrase_for(&self, def: &StatDefinition, appearances_known_zero: bool) -> Option<&str> {
        if def.per_appearance && appearances_known_zero {
            return Some(&self.generic.phrase);
        }
        self.rule_for(def).map(|rule| rule.phrase.as_str())
    }

    /// Whether `answer` is an acceptable zero-answer for `def`.
    pub fn is_valid_zero_answer(
        &self,
        def: &StatDefinition,
        answer: &str,
        appearances_known_zero: bool,
    ) -> bool {
        if def.per_appearance && appearances_known_zero && self.generic.accepts(answer) {
            return true;
        }
        self.rule_for(def).is_some_and(|rule| rule.accepts(answer))
    }

    /// Every rule key must exist and every numeric metric must have a rule.
    pub fn validate_against(&self, registry: &StatRegistry) -> Result<(), RegistryError> {
        let mut keys: Vec<&String> = self.by_key.keys().collect();
        keys.sort();
        for key in keys {
            if registry.get(key).is_none() {
                let rule = &self.rules[self.by_key[key]];
                return Err(RegistryError::UnknownZeroKey {
                    rule: rule.name.clone(),
                    key: key.clone(),
                });
            }
        }
        for def in registry.iter().filter(|d| d.is_numeric()) {
            if self.rule_for(def).is_none() {
                return Err(RegistryError::MissingZeroRule(def.key.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_phrase_always_accepted() {
        let spec = ZeroRuleSpec {
            name: "saves".to_string(),
            phrase: "has not made any saves".to_string(),
            accept: vec![],
            keys: vec!["SAVES".to_string()],
            categories: vec![],
        };
        let rule = ZeroRule::compile(&spec).unwrap();
        assert!(rule.accepts("Oli Goddard has not made any saves."));
        assert!(rule.accepts("OLI GODDARD HAS NOT MADE ANY SAVES"));
        assert!(!rule.accepts("Oli Goddard has made 0 saves."));
    }

    #[test]
    fn test_duplicate_rule_key_rejected() {
        let yaml = r#"
version: "t"
generic: { name: generic, phrase: "has not made an appearance yet" }
rules:
  - { name: a, phrase: "has not scored any goals", keys: [G] }
  - { name: b, phrase: "has not scored a goal", keys: [G] }
"#;
        assert!(matches!(
            ZeroPhraseTable::from_yaml(yaml),
            Err(RegistryError::DuplicateKey(k)) if k == "G"
        ));
    }
}
