use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::catalog::books::list_books;
use crate::catalog::dismissed::list_dismissed_ids;
use crate::catalog::validation::validate_rating;
use crate::errors::AppError;
use crate::models::{Book, BookSummary};
use crate::recommend::fallback::fallback_candidates;
use crate::recommend::log::{LogEntry, LoggedLikedBook, RecommendationLog};
use crate::recommend::oracle::{LikedBook, OracleSource, RecommendationOracle};
use crate::recommend::selector::{select_recommendations, Selection, DEFAULT_NUM_RECOMMENDATIONS};
use crate::recommend::{Engine, RecommendationSource};

pub const MAX_RECOMMENDATIONS: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    /// book id → rating the user gave it.
    #[serde(default)]
    pub user_ratings: HashMap<String, i64>,
    /// Ids of books the user recently viewed.
    #[serde(default)]
    pub user_history: Vec<String>,
    #[serde(default)]
    pub engine: Option<Engine>,
    #[serde(default)]
    pub num_recommendations: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<BookSummary>,
    pub source: RecommendationSource,
}

/// Runs one recommendation request against the catalog and appends a log entry.
///
/// The request's `user_ratings` decide which books count as rated or liked. The
/// stored ratings only feed the per-book averages used for ranking.
pub async fn recommend(
    pool: &SqlitePool,
    oracle: &RecommendationOracle,
    log: &RecommendationLog,
    default_engine: Engine,
    request: RecommendationRequest,
) -> Result<RecommendationResponse, AppError> {
    let n = request
        .num_recommendations
        .unwrap_or(DEFAULT_NUM_RECOMMENDATIONS);
    if n == 0 || n > MAX_RECOMMENDATIONS {
        return Err(AppError::Validation(format!(
            "num_recommendations must be between 1 and {MAX_RECOMMENDATIONS}"
        )));
    }
    for rating in request.user_ratings.values() {
        validate_rating(*rating)?;
    }
    let engine = request.engine.unwrap_or(default_engine);

    let candidates = list_books(pool).await?;
    let dismissed: HashSet<String> = list_dismissed_ids(pool).await?.into_iter().collect();
    let selection = select_recommendations(&candidates, &request.user_ratings, &dismissed, n);

    let (recommendations, source) = if engine == Engine::Llm && !selection.liked.is_empty() {
        model_recommendations(oracle, &candidates, &dismissed, &selection, &request, n).await
    } else {
        (
            selection.recommendations.iter().map(BookSummary::from).collect(),
            selection.strategy,
        )
    };

    info!(
        "Recommended {} books (engine={:?}, source={source}, liked={})",
        recommendations.len(),
        engine,
        selection.liked.len()
    );

    let entry = LogEntry {
        timestamp: Utc::now(),
        liked: selection
            .liked
            .iter()
            .map(|b| LoggedLikedBook {
                title: b.title.clone(),
                author: b.author.clone(),
                rating: request.user_ratings.get(&b.id).copied().unwrap_or_default(),
            })
            .collect(),
        ratings: request.user_ratings,
        recommendations: recommendations.clone(),
        source,
    };
    if let Err(e) = log.append(&entry).await {
        warn!("Failed to write recommendation log {}: {e:#}", log.path().display());
    }

    Ok(RecommendationResponse {
        recommendations,
        source,
    })
}

/// Asks the oracle for suggestions and reconciles them with the catalog.
///
/// Model answers naming a catalog book are served as that book, unless the user
/// already rated or dismissed it. When the oracle falls back, the local topic
/// ranking wins over the static list; the static list is only served when no
/// eligible catalog book is left. A model answer that names only excluded books
/// is treated the same as a fallback.
async fn model_recommendations(
    oracle: &RecommendationOracle,
    candidates: &[Book],
    dismissed: &HashSet<String>,
    selection: &Selection,
    request: &RecommendationRequest,
    n: usize,
) -> (Vec<BookSummary>, RecommendationSource) {
    let by_id: HashMap<&str, &Book> = candidates.iter().map(|b| (b.id.as_str(), b)).collect();
    let excluded = |id: &str| request.user_ratings.contains_key(id) || dismissed.contains(id);

    let liked: Vec<LikedBook> = selection
        .liked
        .iter()
        .map(|b| LikedBook {
            title: b.title.clone(),
            author: b.author.clone(),
            rating: request.user_ratings.get(&b.id).copied().unwrap_or_default(),
            topics: b.topics.clone(),
        })
        .collect();
    let recently_viewed: Vec<String> = request
        .user_history
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).map(|b| b.title.clone()))
        .collect();

    let outcome = oracle.get_recommendations(&liked, &recently_viewed, n).await;
    let static_pool = match outcome.source {
        OracleSource::Model => {
            let recommendations: Vec<BookSummary> = outcome
                .candidates
                .iter()
                .filter(|c| !excluded(&c.id))
                .map(|c| match by_id.get(c.id.as_str()) {
                    Some(book) => BookSummary::from(*book),
                    None => BookSummary::from(c),
                })
                .take(n)
                .collect();
            if !recommendations.is_empty() {
                return (recommendations, RecommendationSource::Model);
            }
            warn!("Model only suggested rated or dismissed books; using local ranking");
            fallback_candidates(n)
        }
        OracleSource::Fallback => outcome.candidates,
    };

    if !selection.recommendations.is_empty() {
        return (
            selection.recommendations.iter().map(BookSummary::from).collect(),
            selection.strategy,
        );
    }

    let recommendations: Vec<BookSummary> = static_pool
        .iter()
        .filter(|c| !excluded(&c.id))
        .map(BookSummary::from)
        .collect();
    (recommendations, RecommendationSource::Fallback)
}
