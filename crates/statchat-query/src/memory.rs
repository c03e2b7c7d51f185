//! In-memory statistics store.
//!
//! Answers generated queries from a fixed table of values keyed by metric,
//! player and filters. Ranking queries behave like the generated Cypher:
//! rows without a finite value are dropped, the rest are ordered by the
//! query's direction and cut to its `$limit`.

use crate::client::{RawValue, ResultRow, StatsClient};
use crate::error::ClientError;
use statchat_core::{Filters, GeneratedQuery, QueryKind, RankDirection};
use std::cmp::Ordering as SortOrder;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ValueKey {
    metric_key: String,
    player: String,
    filters: Filters,
}

#[derive(Debug, Default)]
pub struct MemoryStatsClient {
    values: HashMap<ValueKey, RawValue>,
    /// Insertion order, so ranking rows come back deterministically
    order: Vec<ValueKey>,
    delay: Option<Duration>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MemoryStatsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unfiltered numeric value
    pub fn with_value(self, player: &str, metric_key: &str, value: f64) -> Self {
        self.with_raw(player, metric_key, Filters::default(), RawValue::Number(value))
    }

    pub fn with_filtered_value(
        self,
        player: &str,
        metric_key: &str,
        filters: Filters,
        value: f64,
    ) -> Self {
        self.with_raw(player, metric_key, filters, RawValue::Number(value))
    }

    pub fn with_label(self, player: &str, metric_key: &str, label: &str) -> Self {
        self.with_raw(player, metric_key, Filters::default(), RawValue::from(label))
    }

    pub fn with_raw(
        mut self,
        player: &str,
        metric_key: &str,
        filters: Filters,
        value: RawValue,
    ) -> Self {
        let key = ValueKey {
            metric_key: metric_key.to_string(),
            player: player.to_string(),
            filters,
        };
        if self.values.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
        self
    }

    /// Sleep before answering each query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every query with a connection error.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Queries received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MemoryStatsClient {
    fn ranking_rows(&self, query: &GeneratedQuery) -> Vec<ResultRow> {
        let mut ranked: Vec<(f64, ResultRow)> = self
            .order
            .iter()
            .filter(|key| key.metric_key == query.metric_key && key.filters == query.filters)
            .filter_map(|key| {
                let value = self.values.get(key)?;
                let number = rankable(value)?;
                Some((
                    number,
                    ResultRow {
                        player: key.player.clone(),
                        value: value.clone(),
                    },
                ))
            })
            .collect();

        let ascending = query.direction == Some(RankDirection::Ascending);
        ranked.sort_by(|(a, row_a), (b, row_b)| {
            let by_value = a.partial_cmp(b).unwrap_or(SortOrder::Equal);
            let by_value = if ascending { by_value } else { by_value.reverse() };
            by_value.then_with(|| row_a.player.cmp(&row_b.player))
        });
        if let Some(limit) = query.params.get("limit").and_then(|v| v.as_u64()) {
            ranked.truncate(limit as usize);
        }
        ranked.into_iter().map(|(_, row)| row).collect()
    }
}

/// The store-side `value IS NOT NULL AND value = value` guard.
fn rankable(value: &RawValue) -> Option<f64> {
    let number = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
        RawValue::Null => return None,
    };
    number.is_finite().then_some(number)
}

#[async_trait::async_trait]
impl StatsClient for MemoryStatsClient {
    async fn fetch(&self, query: &GeneratedQuery) -> Result<Vec<ResultRow>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(ClientError::Connection(message.clone()));
        }

        let rows = match (query.kind, &query.subject) {
            (QueryKind::Lookup | QueryKind::AppearanceCheck, Some(subject)) => {
                let key = ValueKey {
                    metric_key: query.metric_key.clone(),
                    player: subject.clone(),
                    filters: query.filters,
                };
                self.values
                    .get(&key)
                    .map(|value| ResultRow {
                        player: subject.clone(),
                        value: value.clone(),
                    })
                    .into_iter()
                    .collect()
            }
            (QueryKind::Ranking, _) => self.ranking_rows(query),
            _ => {
                return Err(ClientError::Decode(format!(
                    "{:?} query without a subject",
                    query.kind
                )))
            }
        };
        Ok(rows)
    }

    fn client_name(&self) -> &str {
        "memory"
    }
}
