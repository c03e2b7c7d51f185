//! Answer template loading.
//!
//! The built-in set is embedded at compile time; an operator may supply
//! another file with the same template names.

use crate::RenderError;
use serde::Deserialize;
use std::collections::HashMap;

const BUILTIN_TEMPLATES: &str = include_str!("../templates/answers.yaml");

/// Template names the composer renders. A templates file must define all.
pub const REQUIRED_TEMPLATES: &[&str] = &[
    "lookup",
    "lookup_zero",
    "lookup_label",
    "lookup_label_missing",
    "comparison",
    "comparison_level",
    "ranking",
    "ranking_single",
    "ranking_empty",
    "unresolved_note",
    "empty_question",
    "unclear_intent",
    "player_not_found",
    "metric_not_recognized",
    "filter_conflict",
    "data_error",
];

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: HashMap<String, Template>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
    #[serde(default)]
    pub example: Option<serde_json::Value>,
    /// Expected rendering of `example`
    #[serde(default)]
    pub output: Option<String>,
}

impl TemplatesFile {
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_yaml(BUILTIN_TEMPLATES)
    }

    pub fn load(path: &str) -> Result<Self, RenderError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Template(format!("failed to read {}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        let file: TemplatesFile = serde_yaml::from_str(yaml)
            .map_err(|e| RenderError::Template(format!("invalid templates YAML: {}", e)))?;
        if let Some(missing) = REQUIRED_TEMPLATES
            .iter()
            .find(|name| !file.templates.contains_key(**name))
        {
            return Err(RenderError::Template(format!(
                "missing template '{}'",
                missing
            )));
        }
        Ok(file)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
