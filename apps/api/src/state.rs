use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::recommend::log::RecommendationLog;
use crate::recommend::oracle::RecommendationOracle;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// Model-backed recommendations; serves the fallback pool when no provider is configured.
    pub oracle: Arc<RecommendationOracle>,
    pub rec_log: RecommendationLog,
}
