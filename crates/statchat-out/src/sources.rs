//! Sources: the values an answer was built from, for audit.

use statchat_core::{GeneratedQuery, Source, StatValue};

#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    sources: Vec<Source>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value and return its id.
    pub fn add(&mut self, subject: &str, metric_key: &str, value: StatValue) -> String {
        let id = format!("src:{}", self.sources.len());
        self.sources.push(Source {
            id: id.clone(),
            subject: subject.to_string(),
            metric_key: metric_key.to_string(),
            value,
        });
        id
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        let index: usize = id.strip_prefix("src:")?.parse().ok()?;
        self.sources.get(index)
    }

    pub fn all(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn into_vec(self) -> Vec<Source> {
        self.sources
    }
}

/// The generated statements joined for the response's audit field.
pub fn audit_query(queries: &[GeneratedQuery]) -> String {
    queries
        .iter()
        .map(|q| q.cypher.as_str())
        .collect::<Vec<_>>()
        .join(";\n\n")
}
