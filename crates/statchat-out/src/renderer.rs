//! Handlebars rendering for answer templates.
//!
//! Helpers:
//! - join_and: `["A", "B", "C"]` -> "A, B and C"
//! - join_or: `["A", "B"]` -> "A or B"
//! - possessive: "Oli Goddard" -> "Oli Goddard's", "Luke Bangs" -> "Luke Bangs'"

use crate::templates::TemplatesFile;
use crate::RenderError;
use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Natural-language list: "A", "A and B", "A, B and C".
pub fn join_words(items: &[String], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), conjunction, last),
    }
}

pub fn possessive(name: &str) -> String {
    if name.ends_with('s') {
        format!("{}'", name)
    } else {
        format!("{}'s", name)
    }
}

fn join_values(items: &[Value], conjunction: &str) -> String {
    let words: Vec<String> = items.iter().map(value_text).collect();
    join_words(&words, conjunction)
}

handlebars_helper!(join_and_helper: |items: array| join_values(items, "and"));
handlebars_helper!(join_or_helper: |items: array| join_values(items, "or"));
handlebars_helper!(possessive_helper: |name: str| possessive(name));

/// Compiled answer templates with helpers registered.
#[derive(Debug)]
pub struct AnswerRenderer {
    handlebars: Handlebars<'static>,
    templates: TemplatesFile,
}

impl AnswerRenderer {
    pub fn new(templates: TemplatesFile) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("join_and", Box::new(join_and_helper));
        handlebars.register_helper("join_or", Box::new(join_or_helper));
        handlebars.register_helper("possessive", Box::new(possessive_helper));

        for (name, template) in &templates.templates {
            handlebars
                .register_template_string(name, &template.template)
                .map_err(|e| RenderError::Template(format!("{}: {}", name, e)))?;
        }

        Ok(AnswerRenderer {
            handlebars,
            templates,
        })
    }

    pub fn builtin() -> Result<Self, RenderError> {
        Self::new(TemplatesFile::builtin()?)
    }

    pub fn render(&self, template_name: &str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render(template_name, data)
            .map_err(|e| RenderError::Render(format!("{}: {}", template_name, e)))
    }

    pub fn templates(&self) -> &TemplatesFile {
        &self.templates
    }

    /// Render every template's example and report those that differ from
    /// the documented output as (name, expected, actual).
    pub fn example_mismatches(&self) -> Vec<(String, String, String)> {
        let mut mismatches = Vec::new();
        for name in self.templates.list_templates() {
            let Some(template) = self.templates.get(name) else {
                continue;
            };
            let (Some(example), Some(expected)) = (&template.example, &template.output) else {
                continue;
            };
            let actual = self
                .render(name, example)
                .unwrap_or_else(|e| e.to_string());
            if &actual != expected {
                mismatches.push((name.to_string(), expected.clone(), actual));
            }
        }
        mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_words() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_words(&names(&[]), "and"), "");
        assert_eq!(join_words(&names(&["A"]), "and"), "A");
        assert_eq!(join_words(&names(&["A", "B"]), "or"), "A or B");
        assert_eq!(join_words(&names(&["A", "B", "C"]), "and"), "A, B and C");
    }

    #[test]
    fn test_possessive() {
        assert_eq!(possessive("Oli Goddard"), "Oli Goddard's");
        assert_eq!(possessive("Luke Bangs"), "Luke Bangs'");
    }

    #[test]
    fn test_examples_render_as_documented() {
        let renderer = AnswerRenderer::builtin().unwrap();
        assert_eq!(renderer.example_mismatches(), Vec::new());
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = AnswerRenderer::builtin().unwrap();
        let text = renderer
            .render(
                "lookup_label",
                &json!({
                    "subject": "Dan O'Brien",
                    "metric": "most common position",
                    "value": "Midfielder",
                    "clause": " for the 2nd & 3rd XI"
                }),
            )
            .unwrap();
        assert_eq!(
            text,
            "Dan O'Brien's most common position for the 2nd & 3rd XI is Midfielder."
        );
    }
}
