//! Data-access client contract.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use statchat_core::GeneratedQuery;

/// A scalar as the data layer returned it, before shape checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// One (player, value) row of a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub player: String,
    pub value: RawValue,
}

/// Executes generated queries against a statistics store.
#[async_trait::async_trait]
pub trait StatsClient: Send + Sync {
    /// Run one query. Implementations never retry.
    async fn fetch(&self, query: &GeneratedQuery) -> Result<Vec<ResultRow>, ClientError>;

    /// Human-readable name for logs (e.g. "memory", "neo4j").
    fn client_name(&self) -> &str;
}
