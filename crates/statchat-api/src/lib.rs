//! Stats chatbot API /v1: REST endpoints
pub mod handlers;
pub mod metrics;
pub mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use metrics::ChatMetrics;
use statchat_engine::{ChatbotEngine, DiagnosticsSink};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatbotEngine>,
    pub sink: DiagnosticsSink,
    pub metrics: ChatMetrics,
}

impl AppState {
    pub fn new(engine: ChatbotEngine) -> Result<Self, prometheus::Error> {
        Ok(Self {
            engine: Arc::new(engine),
            sink: DiagnosticsSink::new(),
            metrics: ChatMetrics::new()?,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/chatbot/question", post(handlers::ask_question))
        .route(
            "/v1/chatbot/processing-details",
            get(handlers::processing_details),
        )
        .route("/v1/registry/stats", get(handlers::list_stats))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "stats chatbot API listening");
    axum::serve(listener, app).await
}
