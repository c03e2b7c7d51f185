//! Query layer for the stats chatbot.
//!
//! - [`builder`] turns a catalog entry, subject and filters into a
//!   parameterised Cypher statement
//! - [`QueryExecutor`] runs it through a [`StatsClient`] with a deadline
//! - [`result`] checks returned rows against the metric's value shape
//!
//! Two clients ship with the crate: [`MemoryStatsClient`] for fixtures and
//! tests, and [`Neo4jHttpClient`] for a live graph.

pub mod builder;
pub mod client;
pub mod error;
pub mod executor;
pub mod memory;
pub mod neo4j;
pub mod result;

pub use builder::{build_appearance_check, build_lookup, build_ranking, check_filters};
pub use client::{RawValue, ResultRow, StatsClient};
pub use error::{ClientError, QueryError};
pub use executor::{QueryExecutor, DEFAULT_QUERY_TIMEOUT};
pub use memory::MemoryStatsClient;
pub use neo4j::{Neo4jConfig, Neo4jHttpClient};
pub use result::{lookup_value, ranked_entries, to_stat_value, RankedEntry};
