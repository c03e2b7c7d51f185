//! Binary entrypoint for the stats chatbot API server.
use anyhow::Context;
use statchat_api::{run, AppState};
use statchat_engine::{ChatbotEngine, EngineConfig};
use statchat_query::{MemoryStatsClient, Neo4jConfig, Neo4jHttpClient, StatsClient};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Default listen address can be overridden with STATCHAT_ADDR
    let addr = std::env::var("STATCHAT_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());

    let mut config = match std::env::var("STATCHAT_CONFIG") {
        Ok(path) => EngineConfig::load(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => EngineConfig::default(),
    };
    if let Ok(path) = std::env::var("STATCHAT_PLAYERS") {
        config.players_path = Some(path);
    }

    let client: Arc<dyn StatsClient> = match std::env::var("STATCHAT_NEO4J_URL") {
        Ok(url) => {
            let neo4j = Neo4jConfig {
                url,
                database: std::env::var("STATCHAT_NEO4J_DATABASE")
                    .unwrap_or_else(|_| "neo4j".to_string()),
                username: std::env::var("STATCHAT_NEO4J_USER").ok(),
                password: std::env::var("STATCHAT_NEO4J_PASSWORD").ok(),
            };
            info!(url = %neo4j.url, database = %neo4j.database, "using Neo4j statistics store");
            Arc::new(
                Neo4jHttpClient::new(neo4j, config.query_timeout())
                    .context("building Neo4j client")?,
            )
        }
        Err(_) => {
            warn!("STATCHAT_NEO4J_URL not set; serving from an empty in-memory store");
            Arc::new(MemoryStatsClient::new())
        }
    };

    let engine = ChatbotEngine::from_config(config, client).context("starting chatbot engine")?;
    let state = AppState::new(engine).context("registering metrics")?;
    run(&addr, state).await.context("API server")?;
    Ok(())
}
