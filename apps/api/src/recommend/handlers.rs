use axum::{extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::recommend::service::{recommend, RecommendationRequest, RecommendationResponse};
use crate::state::AppState;

/// POST /api/v1/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    info!(
        "Recommendation request: {} ratings, {} history entries, engine={:?}",
        request.user_ratings.len(),
        request.user_history.len(),
        request.engine
    );

    let response = recommend(
        &state.db,
        &state.oracle,
        &state.rec_log,
        state.config.recommendation_engine,
        request,
    )
    .await?;
    Ok(Json(response))
}
