// Catalog store: books, ratings, the dismissed list and the wishlist.
// Only this module talks SQL; recommendation code works on the copies it returns.

pub mod books;
pub mod dismissed;
pub mod handlers;
pub mod ratings;
pub mod validation;
pub mod wishlist;

use crate::errors::AppError;

/// Columns of a book plus its rating aggregate. Callers append WHERE/GROUP BY/ORDER BY.
pub(crate) const BOOK_COLUMNS: &str = "\
    b.id, b.title, b.author, b.description, b.topics, b.technical_level, \
    b.publication_year, b.page_count, \
    COALESCE(AVG(r.rating), 0.0) AS average_rating, \
    COUNT(r.id) AS rating_count";

/// Maps a UNIQUE constraint violation to a validation error, passing other errors through.
pub(crate) fn unique_violation_as(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
