use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::book::{Book, BookRow};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WishlistRow {
    pub book_id: String,
    pub display_order: i64,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A wishlist row joined with the book it points at.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntry {
    #[serde(flatten)]
    pub book: Book,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
    pub display_order: i64,
}

impl WishlistEntry {
    pub fn from_parts(row: WishlistRow, book: BookRow) -> Self {
        Self {
            book: Book::from(book),
            notes: row.notes,
            added_at: row.timestamp,
            display_order: row.display_order,
        }
    }
}
