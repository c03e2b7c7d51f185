//! Stage tracing: per-call record of each pipeline stage with content hashes.
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTrace {
    pub id: String,
    pub in_hash: String,
    pub out_hash: String,
    pub deterministic: bool,
    pub latency_ms: u64,
}

/// An in-flight stage, created by [`TraceRecorder::begin`].
#[must_use]
pub struct StageTimer {
    id: &'static str,
    deterministic: bool,
    in_hash: String,
    started: Instant,
}

/// Collects [`StageTrace`]s for one call. Owned by the call, never shared.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    stages: Vec<StageTrace>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin<I: Serialize + ?Sized>(&self, id: &'static str, input: &I) -> StageTimer {
        StageTimer {
            id,
            deterministic: true,
            in_hash: hash_value(input),
            started: Instant::now(),
        }
    }

    /// Like [`begin`](Self::begin) for stages that depend on external data.
    pub fn begin_external<I: Serialize + ?Sized>(&self, id: &'static str, input: &I) -> StageTimer {
        StageTimer {
            deterministic: false,
            ..self.begin(id, input)
        }
    }

    pub fn finish<O: Serialize + ?Sized>(&mut self, timer: StageTimer, output: &O) {
        self.stages.push(StageTrace {
            id: timer.id.to_string(),
            in_hash: timer.in_hash,
            out_hash: hash_value(output),
            deterministic: timer.deterministic,
            latency_ms: timer.started.elapsed().as_millis() as u64,
        });
    }

    pub fn stages(&self) -> &[StageTrace] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<StageTrace> {
        self.stages
    }
}

fn hash_value<T: Serialize + ?Sized>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    format!("blake3:{}", blake3::hash(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_stages_in_order() {
        let mut recorder = TraceRecorder::new();
        let timer = recorder.begin("extract", "how many goals");
        recorder.finish(timer, &vec!["Luke Bangs"]);
        let timer = recorder.begin_external("fetch", &42);
        recorder.finish(timer, &3.0);

        let stages = recorder.into_stages();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].id, "extract");
        assert!(stages[0].deterministic);
        assert!(!stages[1].deterministic);
        assert!(stages[0].in_hash.starts_with("blake3:"));
    }

    #[test]
    fn test_hash_is_content_addressed() {
        assert_eq!(hash_value("abc"), hash_value("abc"));
        assert_ne!(hash_value("abc"), hash_value("abd"));
    }
}
