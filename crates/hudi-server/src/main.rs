//! # hudi-server: HTTP Service for Hudi Partition Pruning
//!
//! Exposes the partition manager over HTTP so that a coordinator (or a person with
//! `curl`) can ask which partitions of a registered Hudi table a predicate needs.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   | HTTP POST /partitions (JSON predicate)
//!   v
//! hudi-server (this binary)
//!   |
//!   +-> decode domain literals with the column types
//!   +-> partition manager: metastore push-down, then exact re-check
//!   |
//!   | HTTP response (surviving partition names)
//!   v
//! Client
//! ```
//!
//! ## Endpoints
//!
//! - `GET  /health`      - Health check
//! - `GET  /tables`      - List registered tables
//! - `POST /tables`      - Register a table and its partition names
//! - `POST /partitions`  - Prune partitions for a predicate
//!
//! ## Configuration
//!
//! See [`config`] for the environment variables. Logging is controlled by
//! `RUST_LOG` (defaults to `hudi_pruning=debug,hudi_server=debug`).

mod config;
mod routes;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "hudi_pruning=debug,hudi_server=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::ServerConfig::from_env()?;

    let state = state::AppState::new(config.manager);
    if let Some(path) = &config.catalog_path {
        let tables = state.seed_from_file(path)?;
        tracing::info!(path = %path.display(), tables, "loaded catalog");
    }
    let state = Arc::new(state);

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/tables", get(routes::list_tables).post(routes::register_table))
        .route("/partitions", post(routes::partitions))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(
        listen = %config.listen,
        time_zone = %config.manager.time_zone,
        "hudi-server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
