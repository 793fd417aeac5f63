pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::catalog::handlers;
use crate::recommend::handlers::handle_recommendations;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route(
            "/api/v1/books",
            get(handlers::handle_list_books).post(handlers::handle_add_book),
        )
        .route("/api/v1/books/:id", get(handlers::handle_get_book))
        .route(
            "/api/v1/ratings",
            get(handlers::handle_list_ratings).post(handlers::handle_submit_rating),
        )
        .route(
            "/api/v1/dismissed",
            get(handlers::handle_list_dismissed).post(handlers::handle_dismiss_book),
        )
        .route(
            "/api/v1/wishlist",
            get(handlers::handle_get_wishlist).post(handlers::handle_add_to_wishlist),
        )
        .route(
            "/api/v1/wishlist/order",
            put(handlers::handle_reorder_wishlist),
        )
        .route(
            "/api/v1/wishlist/:book_id",
            delete(handlers::handle_remove_from_wishlist),
        )
        // Recommendations
        .route("/api/v1/recommendations", post(handle_recommendations))
        .with_state(state)
}
