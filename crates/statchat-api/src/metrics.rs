//! Prometheus counters for answered questions.
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use statchat_core::AnswerResponse;
use std::time::Duration;

#[derive(Clone)]
pub struct ChatMetrics {
    registry: Registry,
    questions: IntCounterVec,
    failures: IntCounterVec,
    latency: Histogram,
}

impl ChatMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let questions = IntCounterVec::new(
            Opts::new("statchat_questions_total", "Questions answered, by intent"),
            &["intent"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("statchat_failures_total", "Questions answered with a failure message, by kind"),
            &["kind"],
        )?;
        let latency = Histogram::with_opts(
            HistogramOpts::new("statchat_answer_seconds", "Time to answer one question")
                .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(questions.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        Ok(Self {
            registry,
            questions,
            failures,
            latency,
        })
    }

    pub fn observe(&self, response: &AnswerResponse, elapsed: Duration) {
        let intent = response
            .processing_details
            .as_ref()
            .map(|d| format!("{:?}", d.question_analysis.intent).to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());
        self.questions.with_label_values(&[&intent]).inc();
        if let Some(kind) = response.failure() {
            self.failures.with_label_values(&[kind.as_str()]).inc();
        }
        self.latency.observe(elapsed.as_secs_f64());
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

pub fn encode(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).to_string())
}
