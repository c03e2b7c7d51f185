//! The chatbot engine: question in, answer out.
//!
//! ```text
//! QuestionContext → parse → classify → build/fetch → shape check → compose → shape gate
//!                     ↓                     ↓                          ↓
//!               ParsedQuestion        GeneratedQuery               AnswerResponse
//! ```
//!
//! The engine holds only load-once, read-only state. Everything about one
//! call (queries, sources, trace) lives in that call and is returned in
//! its `AnswerResponse`.

use crate::config::EngineConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::directory::load_directory;
use crate::EngineError;
use chrono::Utc;
use statchat_core::{
    AnswerResponse, FailureKind, GeneratedQuery, Intent, ParsedQuestion, ProcessingDetails,
    QueryBreakdown, QuestionContext, StatValue, TraceRecorder,
};
use statchat_in::{ParseOutcome, PlayerDirectory, QuestionParser};
use statchat_out::quality::{check_answer, enforce};
use statchat_out::{
    audit_query, classify_parse, effective_filters, failure_message, AnswerComposer,
    AnswerRenderer, ComparedValue, FailureDetails, SourceSet, TemplatesFile,
};
use statchat_query::{
    build_appearance_check, build_lookup, build_ranking, lookup_value, ranked_entries,
    QueryError, QueryExecutor, ResultRow, StatsClient,
};
use statchat_registry::{StatDefinition, StatRegistry, ZeroPhraseTable};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Catalog key of the appearance count used for zero-phrase follow-ups.
pub const APPEARANCES_KEY: &str = "APP";

/// Sent if even the failure message cannot be rendered.
const LAST_RESORT_ANSWER: &str = "Sorry, something went wrong while answering that question.";

/// Why a call could not be answered normally.
#[derive(Debug)]
struct Failure {
    kind: FailureKind,
    details: FailureDetails,
}

impl Failure {
    fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            details: FailureDetails::default(),
        }
    }
}

/// State owned by one call.
struct Call {
    trace: TraceRecorder,
    queries: Vec<GeneratedQuery>,
    sources: SourceSet,
    /// Subjects the answer text must name verbatim
    named: Vec<String>,
}

pub struct ChatbotEngine {
    registry: Arc<StatRegistry>,
    zero_phrases: Arc<ZeroPhraseTable>,
    parser: QuestionParser,
    executor: QueryExecutor,
    composer: AnswerComposer,
    config: EngineConfig,
}

impl ChatbotEngine {
    /// Build from config, loading the player list from `players_path`.
    pub fn from_config(
        config: EngineConfig,
        client: Arc<dyn StatsClient>,
    ) -> Result<Self, EngineError> {
        let directory = match &config.players_path {
            Some(path) => load_directory(path)?,
            None => {
                warn!("no players_path configured; every named player will be unknown");
                PlayerDirectory::default()
            }
        };
        Self::new(config, directory, client)
    }

    pub fn new(
        config: EngineConfig,
        directory: PlayerDirectory,
        client: Arc<dyn StatsClient>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let registry = match &config.catalog_path {
            Some(path) => StatRegistry::load(path)?,
            None => StatRegistry::builtin()?,
        };
        let zero_phrases = match &config.zero_phrases_path {
            Some(path) => ZeroPhraseTable::load(path)?,
            None => ZeroPhraseTable::builtin()?,
        };
        zero_phrases.validate_against(&registry)?;
        let templates = match &config.templates_path {
            Some(path) => TemplatesFile::load(path)?,
            None => TemplatesFile::builtin()?,
        };
        let renderer = AnswerRenderer::new(templates)?;

        let registry = Arc::new(registry);
        let zero_phrases = Arc::new(zero_phrases);
        let parser = QuestionParser::new(
            registry.clone(),
            Arc::new(directory),
            config.parser_options(),
        );
        info!(
            catalog = registry.version(),
            stats = registry.len(),
            players = parser.directory().len(),
            client = client.client_name(),
            "chatbot engine ready"
        );

        Ok(Self {
            executor: QueryExecutor::new(client, config.query_timeout()),
            composer: AnswerComposer::new(Arc::new(renderer), zero_phrases.clone()),
            registry,
            zero_phrases,
            parser,
            config,
        })
    }

    pub fn registry(&self) -> &StatRegistry {
        &self.registry
    }

    pub fn zero_phrases(&self) -> &ZeroPhraseTable {
        &self.zero_phrases
    }

    pub fn directory(&self) -> &PlayerDirectory {
        self.parser.directory()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer one question. Never fails: every problem becomes a polite
    /// answer and is recorded in the processing details.
    pub async fn process_question(&self, context: &QuestionContext) -> AnswerResponse {
        let started = Instant::now();
        let trace_id = Uuid::new_v4().to_string();
        let mut call = Call {
            trace: TraceRecorder::new(),
            queries: Vec::new(),
            sources: SourceSet::new(),
            named: Vec::new(),
        };

        let timer = call.trace.begin("parse", context);
        let outcome = self.parser.parse(context);
        call.trace.finish(timer, &outcome.parsed);

        let result = self.answer(&outcome, &mut call).await;
        let (text, failure) = match result {
            Ok(text) => (text, None),
            Err(failure) => {
                self.log_failure(&trace_id, &outcome.parsed, &call.queries, &failure);
                call.named.clear();
                let text = failure_message(self.composer.renderer(), failure.kind, &failure.details)
                    .unwrap_or_else(|e| {
                        error!(trace_id = %trace_id, error = %e, "failure message did not render");
                        LAST_RESORT_ANSWER.to_string()
                    });
                (text, Some(failure.kind))
            }
        };

        let timer = call.trace.begin("shape_gate", &text);
        let answer = enforce(&text);
        let shape_checks = check_answer(&answer, &call.named);
        call.trace.finish(timer, &answer);
        for check in shape_checks.iter().filter(|c| !c.passed) {
            warn!(trace_id = %trace_id, check = %check.name, message = %check.message, "answer failed shape check");
        }

        let definition = outcome
            .parsed
            .metric_key
            .as_deref()
            .and_then(|key| self.registry.get(key));
        let query_breakdown = QueryBreakdown {
            resolved_subjects: outcome.parsed.subjects.clone(),
            unresolved_subjects: outcome.parsed.unresolved_subjects.clone(),
            defaulted_subject: outcome.analysis.defaulted_subject,
            matched_alias: outcome.analysis.matched_alias.clone(),
            metric: definition.map(|d| d.metric.clone()),
            effective_filters: match definition {
                Some(def) => effective_filters(def, &outcome.parsed.filters),
                None => outcome.parsed.filters,
            },
            failure,
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        info!(
            trace_id = %trace_id,
            intent = ?outcome.parsed.intent,
            metric = ?outcome.parsed.metric_key,
            failure = ?failure,
            latency_ms,
            "answered question"
        );

        AnswerResponse {
            answer,
            sources: call.sources.into_vec(),
            cypher_query: audit_query(&call.queries),
            processing_details: Some(ProcessingDetails {
                trace_id,
                answered_at: Utc::now(),
                question_analysis: outcome.parsed,
                cypher_queries: call.queries,
                query_breakdown,
                trace: call.trace.into_stages(),
                shape_checks,
            }),
        }
    }

    /// Like [`process_question`](Self::process_question), also publishing
    /// the processing details to `sink`.
    pub async fn process_question_with_sink(
        &self,
        context: &QuestionContext,
        sink: &DiagnosticsSink,
    ) -> AnswerResponse {
        let response = self.process_question(context).await;
        if let Some(details) = &response.processing_details {
            sink.publish(details.clone());
        }
        response
    }

    async fn answer(&self, outcome: &ParseOutcome, call: &mut Call) -> Result<String, Failure> {
        let parsed = &outcome.parsed;
        if let Some(kind) = classify_parse(parsed, outcome.analysis.empty) {
            return Err(Failure {
                kind,
                details: FailureDetails {
                    unresolved: parsed.unresolved_subjects.clone(),
                    ..Default::default()
                },
            });
        }
        let def = parsed
            .metric_key
            .as_deref()
            .and_then(|key| self.registry.get(key))
            .ok_or_else(|| Failure::new(FailureKind::MetricNotRecognized))?;

        match parsed.intent {
            Intent::Ranking => self.answer_ranking(def, parsed, call).await,
            Intent::Comparison if parsed.subjects.len() >= 2 => {
                self.answer_comparison(def, parsed, call).await
            }
            // A lookup, or a comparison whose other subjects were not found
            _ => self.answer_lookup(def, parsed, call).await,
        }
    }

    async fn answer_lookup(
        &self,
        def: &StatDefinition,
        parsed: &ParsedQuestion,
        call: &mut Call,
    ) -> Result<String, Failure> {
        let subject = parsed
            .subjects
            .first()
            .ok_or_else(|| Failure::new(FailureKind::PlayerNotFound))?;
        let value = self.fetch_value(def, subject, parsed, call).await?;

        let appearances_known_zero = if def.per_appearance && value.is_zero() {
            self.has_no_appearances(def, subject, parsed, call).await
        } else {
            false
        };

        let timer = call.trace.begin("compose", &value);
        let mut text = self
            .composer
            .lookup(def, subject, &value, &parsed.filters, appearances_known_zero)
            .map_err(|e| self.render_failure(e))?;
        self.append_unresolved(&mut text, parsed)?;
        call.trace.finish(timer, &text);

        call.named.push(subject.clone());
        Ok(text)
    }

    async fn answer_comparison(
        &self,
        def: &StatDefinition,
        parsed: &ParsedQuestion,
        call: &mut Call,
    ) -> Result<String, Failure> {
        if !def.is_numeric() {
            return Err(self.query_failure(def, QueryError::NotOrderable(def.key.clone())));
        }

        let mut values = Vec::with_capacity(parsed.subjects.len());
        for subject in &parsed.subjects {
            let value = self.fetch_value(def, subject, parsed, call).await?;
            values.push(ComparedValue {
                subject: subject.clone(),
                value,
            });
        }

        let timer = call.trace.begin("compose", &parsed.subjects);
        let mut text = self
            .composer
            .comparison(def, &values, &parsed.filters, parsed.rank_direction)
            .map_err(|e| self.render_failure(e))?;
        self.append_unresolved(&mut text, parsed)?;
        call.trace.finish(timer, &text);

        call.named.extend(parsed.subjects.iter().cloned());
        Ok(text)
    }

    async fn answer_ranking(
        &self,
        def: &StatDefinition,
        parsed: &ParsedQuestion,
        call: &mut Call,
    ) -> Result<String, Failure> {
        let limit = parsed.rank_limit.unwrap_or(self.config.default_rank_limit);
        let query = build_ranking(def, &parsed.filters, limit, parsed.rank_direction)
            .map_err(|e| self.query_failure(def, e))?;
        let rows = self.run_query(query, call).await.map_err(|e| self.query_failure(def, e))?;
        let entries = ranked_entries(def, &rows, parsed.rank_direction, limit)
            .map_err(|e| self.query_failure(def, e))?;
        for entry in &entries {
            call.sources
                .add(&entry.player, &def.key, StatValue::Number(entry.value));
        }

        let timer = call.trace.begin("compose", &entries);
        let text = self
            .composer
            .ranking(def, &entries, &parsed.filters, parsed.rank_direction)
            .map_err(|e| self.render_failure(e))?;
        call.trace.finish(timer, &text);
        Ok(text)
    }

    async fn fetch_value(
        &self,
        def: &StatDefinition,
        subject: &str,
        parsed: &ParsedQuestion,
        call: &mut Call,
    ) -> Result<StatValue, Failure> {
        let query =
            build_lookup(def, subject, &parsed.filters).map_err(|e| self.query_failure(def, e))?;
        let rows = self.run_query(query, call).await.map_err(|e| self.query_failure(def, e))?;
        let value = lookup_value(def, &rows).map_err(|e| self.query_failure(def, e))?;
        call.sources.add(subject, &def.key, value.clone());
        Ok(value)
    }

    /// Whether the subject has no appearances under the same filters.
    /// A failed check falls back to the metric's own zero phrase.
    async fn has_no_appearances(
        &self,
        def: &StatDefinition,
        subject: &str,
        parsed: &ParsedQuestion,
        call: &mut Call,
    ) -> bool {
        let Some(appearances) = self.registry.get(APPEARANCES_KEY) else {
            warn!(key = APPEARANCES_KEY, "catalog has no appearance metric");
            return false;
        };
        let query = match build_appearance_check(appearances, def, subject, &parsed.filters) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, "appearance check not applicable");
                return false;
            }
        };
        let rows = match self.run_query(query, call).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(subject, error = %e, "appearance check failed");
                return false;
            }
        };
        matches!(lookup_value(appearances, &rows), Ok(value) if value.is_zero())
    }

    async fn run_query(
        &self,
        query: GeneratedQuery,
        call: &mut Call,
    ) -> Result<Vec<ResultRow>, QueryError> {
        let timer = call.trace.begin_external("fetch", &query);
        let result = self.executor.execute(&query).await;
        call.queries.push(query);
        match &result {
            Ok(rows) => call.trace.finish(timer, rows),
            Err(e) => call.trace.finish(timer, &e.to_string()),
        }
        result
    }

    fn append_unresolved(&self, text: &mut String, parsed: &ParsedQuestion) -> Result<(), Failure> {
        if parsed.unresolved_subjects.is_empty() {
            return Ok(());
        }
        let note = self
            .composer
            .unresolved_note(&parsed.unresolved_subjects)
            .map_err(|e| self.render_failure(e))?;
        text.push(' ');
        text.push_str(&note);
        Ok(())
    }

    fn query_failure(&self, def: &StatDefinition, err: QueryError) -> Failure {
        let kind = err.failure_kind();
        let filter_kinds = match &err {
            QueryError::FilterConflict { kinds, .. } => kinds.clone(),
            _ => Vec::new(),
        };
        debug!(metric = %def.key, error = %err, "query stage failed");
        Failure {
            kind,
            details: FailureDetails {
                metric: Some(def.metric.clone()),
                filter_kinds,
                ..Default::default()
            },
        }
    }

    fn render_failure(&self, err: statchat_out::RenderError) -> Failure {
        error!(error = %err, "answer did not render");
        Failure::new(FailureKind::DataError)
    }

    fn log_failure(
        &self,
        trace_id: &str,
        parsed: &ParsedQuestion,
        queries: &[GeneratedQuery],
        failure: &Failure,
    ) {
        if failure.kind == FailureKind::DataError {
            let parsed_json = serde_json::to_string(parsed).unwrap_or_default();
            let queries_json = serde_json::to_string(queries).unwrap_or_default();
            error!(
                trace_id,
                failure = %failure.kind,
                parsed = %parsed_json,
                queries = %queries_json,
                "question failed with a data error"
            );
        } else {
            warn!(
                trace_id,
                failure = %failure.kind,
                metric = ?parsed.metric_key,
                unresolved = ?parsed.unresolved_subjects,
                "question could not be answered"
            );
        }
    }
}

impl std::fmt::Debug for ChatbotEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatbotEngine")
            .field("stats", &self.registry.len())
            .field("players", &self.parser.directory().len())
            .field("executor", &self.executor)
            .field("config", &self.config)
            .finish()
    }
}
