//! API Handlers
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use statchat_core::QuestionContext;
use std::time::Instant;
use tracing::error;

/// Answer one question. Processing details go to the diagnostics sink,
/// never into this response.
pub async fn ask_question(
    State(state): State<AppState>,
    Json(context): Json<QuestionContext>,
) -> (StatusCode, Json<Value>) {
    let started = Instant::now();
    let response = state
        .engine
        .process_question_with_sink(&context, &state.sink)
        .await;
    state.metrics.observe(&response, started.elapsed());

    let response = response.without_details();
    (
        StatusCode::OK,
        Json(json!({
            "answer": response.answer,
            "sources": response.sources,
            "cypherQuery": response.cypher_query,
        })),
    )
}

pub async fn processing_details(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.sink.latest() {
        Some(details) => (StatusCode::OK, Json(json!(details))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no question has been answered yet" })),
        ),
    }
}

pub async fn list_stats(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let registry = state.engine.registry();
    let stats: Vec<Value> = registry
        .iter()
        .map(|def| {
            json!({
                "key": def.key,
                "metric": def.metric,
                "questionTemplate": def.question_template,
                "extractionPattern": def.extraction_pattern.as_str(),
                "decimalPlaces": def.decimal_places,
                "category": def.category,
            })
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({
            "version": registry.version(),
            "count": stats.len(),
            "stats": stats,
        })),
    )
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "stats": state.engine.registry().len(),
            "players": state.engine.directory().len(),
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match crate::metrics::encode(state.metrics.registry()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                String::new(),
            )
        }
    }
}
