use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

/// Row shape of a book joined with its rating aggregate.
/// `topics` is the raw JSON array text from the `books.topics` column.
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub topics: String,
    pub technical_level: Option<String>,
    pub publication_year: Option<i64>,
    pub page_count: Option<i64>,
    pub average_rating: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub topics: Vec<String>,
    pub technical_level: Option<String>,
    pub publication_year: Option<i64>,
    pub page_count: Option<i64>,
    /// Mean of the book's rating rows, `0.0` when unrated.
    pub average_rating: f64,
    pub rating_count: i64,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        // A malformed topics column degrades to "no topics" rather than hiding the book.
        let topics = serde_json::from_str::<Vec<String>>(&row.topics).unwrap_or_else(|e| {
            tracing::warn!("Book {} has unreadable topics {:?}: {e}", row.id, row.topics);
            Vec::new()
        });

        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            topics,
            technical_level: row.technical_level,
            publication_year: row.publication_year,
            page_count: row.page_count,
            average_rating: row.average_rating,
            rating_count: row.rating_count,
        }
    }
}

/// Book as returned by the recommendation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub topics: Vec<String>,
    pub publication_year: Option<i64>,
    pub page_count: Option<i64>,
    pub average_rating: f64,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            topics: book.topics.clone(),
            publication_year: book.publication_year,
            page_count: book.page_count,
            average_rating: book.average_rating,
        }
    }
}

/// Stable book identifier: the first 16 hex characters of SHA-256(title + author).
/// Re-adding the same title/author pair always yields the same id.
pub fn derive_book_id(title: &str, author: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(author.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
