use crate::client::{ResultRow, StatsClient};
use crate::error::QueryError;
use statchat_core::GeneratedQuery;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs generated queries with a per-query deadline. Never retries.
#[derive(Clone)]
pub struct QueryExecutor {
    client: Arc<dyn StatsClient>,
    timeout: Duration,
}

impl QueryExecutor {
    pub fn new(client: Arc<dyn StatsClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn client_name(&self) -> &str {
        self.client.client_name()
    }

    pub async fn execute(&self, query: &GeneratedQuery) -> Result<Vec<ResultRow>, QueryError> {
        match tokio::time::timeout(self.timeout, self.client.fetch(query)).await {
            Ok(Ok(rows)) => {
                debug!(
                    client = self.client.client_name(),
                    metric = %query.metric_key,
                    rows = rows.len(),
                    "query completed"
                );
                Ok(rows)
            }
            Ok(Err(e)) => {
                warn!(
                    client = self.client.client_name(),
                    metric = %query.metric_key,
                    error = %e,
                    "query failed"
                );
                Err(QueryError::Client(e))
            }
            Err(_) => {
                warn!(
                    client = self.client.client_name(),
                    metric = %query.metric_key,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "query timed out"
                );
                Err(QueryError::Timeout(self.timeout))
            }
        }
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("client", &self.client.client_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
