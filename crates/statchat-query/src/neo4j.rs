//! Neo4j HTTP transaction endpoint client.

use crate::client::{RawValue, ResultRow, StatsClient};
use crate::error::ClientError;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use statchat_core::GeneratedQuery;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for a Neo4j server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Base URL, e.g. "http://localhost:7474"
    pub url: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_database() -> String {
    "neo4j".to_string()
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Debug, Deserialize)]
struct DataRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    code: String,
    message: String,
}

pub struct Neo4jHttpClient {
    client: reqwest::Client,
    config: Neo4jConfig,
    endpoint: String,
}

impl Neo4jHttpClient {
    pub fn new(config: Neo4jConfig, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let endpoint = format!(
            "{}/db/{}/tx/commit",
            config.url.trim_end_matches('/'),
            config.database
        );
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn to_raw(value: &Value) -> RawValue {
    match value {
        Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
        Value::String(s) => RawValue::Text(s.clone()),
        Value::Null => RawValue::Null,
        other => RawValue::Text(other.to_string()),
    }
}

/// Rows are `[playerName, value]` as every generated query returns them.
fn decode_rows(response: CommitResponse) -> Result<Vec<ResultRow>, ClientError> {
    if let Some(error) = response.errors.into_iter().next() {
        return Err(ClientError::Database {
            code: error.code,
            message: error.message,
        });
    }
    let Some(result) = response.results.into_iter().next() else {
        return Ok(Vec::new());
    };
    result
        .data
        .into_iter()
        .map(|data| match data.row.as_slice() {
            [Value::String(player), value] => Ok(ResultRow {
                player: player.clone(),
                value: to_raw(value),
            }),
            other => Err(ClientError::Decode(format!(
                "expected [playerName, value], got {}",
                Value::Array(other.to_vec())
            ))),
        })
        .collect()
}

#[async_trait::async_trait]
impl StatsClient for Neo4jHttpClient {
    async fn fetch(&self, query: &GeneratedQuery) -> Result<Vec<ResultRow>, ClientError> {
        let body = json!({
            "statements": [{
                "statement": query.cypher,
                "parameters": query.params,
            }]
        });

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, endpoint = %self.endpoint, "neo4j returned non-success status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CommitResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        let rows = decode_rows(parsed)?;
        debug!(metric = %query.metric_key, rows = rows.len(), "neo4j query returned");
        Ok(rows)
    }

    fn client_name(&self) -> &str {
        "neo4j"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rows() {
        let response: CommitResponse = serde_json::from_value(json!({
            "results": [{
                "columns": ["playerName", "value"],
                "data": [
                    {"row": ["Luke Bangs", 25], "meta": [null, null]},
                    {"row": ["Oli Goddard", null], "meta": [null, null]}
                ]
            }],
            "errors": []
        }))
        .unwrap();
        let rows = decode_rows(response).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, RawValue::Number(25.0));
        assert_eq!(rows[1].value, RawValue::Null);
    }

    #[test]
    fn test_decode_database_error() {
        let response: CommitResponse = serde_json::from_value(json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        }))
        .unwrap();
        assert!(matches!(decode_rows(response), Err(ClientError::Database { .. })));
    }

    #[test]
    fn test_endpoint() {
        let client = Neo4jHttpClient::new(
            Neo4jConfig {
                url: "http://localhost:7474/".into(),
                database: "stats".into(),
                username: None,
                password: None,
            },
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:7474/db/stats/tx/commit");
    }
}
