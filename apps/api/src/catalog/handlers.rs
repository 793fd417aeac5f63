//! Axum route handlers for the catalog API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::catalog::books::{add_book, get_book, list_books, NewBook};
use crate::catalog::dismissed::{insert_dismissed, list_dismissed_ids};
use crate::catalog::ratings::{list_ratings, upsert_rating, RatingOutcome, RatingRequest};
use crate::catalog::wishlist::{
    insert_wishlist_entry, list_wishlist, remove_wishlist_entry, reorder_wishlist,
    WishlistOrder, WishlistRequest,
};
use crate::errors::AppError;
use crate::models::{Book, RatingRow, WishlistEntry, WishlistRow};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RatingsResponse {
    pub ratings: Vec<RatingRow>,
}

#[derive(Debug, Deserialize)]
pub struct DismissRequest {
    pub book_id: String,
}

#[derive(Debug, Serialize)]
pub struct DismissedResponse {
    pub dismissed_books: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub wishlist: Vec<WishlistEntry>,
}

/// GET /api/v1/books
pub async fn handle_list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(list_books(&state.db).await?))
}

/// POST /api/v1/books
pub async fn handle_add_book(
    State(state): State<AppState>,
    Json(request): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = add_book(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /api/v1/books/:id
pub async fn handle_get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(get_book(&state.db, &id).await?))
}

/// GET /api/v1/ratings
pub async fn handle_list_ratings(
    State(state): State<AppState>,
) -> Result<Json<RatingsResponse>, AppError> {
    let ratings = list_ratings(&state.db).await?;
    Ok(Json(RatingsResponse { ratings }))
}

/// POST /api/v1/ratings
pub async fn handle_submit_rating(
    State(state): State<AppState>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<RatingOutcome>, AppError> {
    let outcome = upsert_rating(&state.db, request.book_id.trim(), request.rating).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/dismissed
pub async fn handle_list_dismissed(
    State(state): State<AppState>,
) -> Result<Json<DismissedResponse>, AppError> {
    let dismissed_books = list_dismissed_ids(&state.db).await?;
    Ok(Json(DismissedResponse { dismissed_books }))
}

/// POST /api/v1/dismissed
pub async fn handle_dismiss_book(
    State(state): State<AppState>,
    Json(request): Json<DismissRequest>,
) -> Result<StatusCode, AppError> {
    insert_dismissed(&state.db, request.book_id.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/wishlist
pub async fn handle_get_wishlist(
    State(state): State<AppState>,
) -> Result<Json<WishlistResponse>, AppError> {
    let wishlist = list_wishlist(&state.db).await?;
    Ok(Json(WishlistResponse { wishlist }))
}

/// POST /api/v1/wishlist
pub async fn handle_add_to_wishlist(
    State(state): State<AppState>,
    Json(request): Json<WishlistRequest>,
) -> Result<(StatusCode, Json<WishlistRow>), AppError> {
    let row = insert_wishlist_entry(&state.db, request.book_id.trim(), request.notes).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/v1/wishlist/:book_id
pub async fn handle_remove_from_wishlist(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove_wishlist_entry(&state.db, &book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/wishlist/order
pub async fn handle_reorder_wishlist(
    State(state): State<AppState>,
    Json(orders): Json<Vec<WishlistOrder>>,
) -> Result<StatusCode, AppError> {
    if orders.is_empty() {
        return Err(AppError::Validation("order list cannot be empty".to_string()));
    }
    reorder_wishlist(&state.db, &orders).await?;
    Ok(StatusCode::NO_CONTENT)
}
