mod catalog;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod recommend;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::build_provider;
use crate::recommend::log::RecommendationLog;
use crate::recommend::oracle::{RecommendationOracle, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; invalid values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting book recommendation API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (schema applied on connect)
    let db = create_pool(&config.database_url).await?;

    // Initialize the recommendation oracle; no provider means fallback-only
    let provider = build_provider(&config)?;
    let policy = RetryPolicy::from_config(&config);
    let oracle = Arc::new(RecommendationOracle::new(provider, policy));
    info!(
        "Recommendation oracle ready (model: {}, attempts: {}, timeout: {:?}, default engine: {:?})",
        oracle.has_provider(),
        policy.max_attempts,
        policy.attempt_timeout,
        config.recommendation_engine
    );

    let rec_log = RecommendationLog::new(&config.recommendation_log_path);
    info!("Recommendation log: {}", rec_log.path().display());

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        oracle,
        rec_log,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
