use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::catalog::validation::{normalize_topics, require_non_blank};
use crate::catalog::{unique_violation_as, BOOK_COLUMNS};
use crate::errors::AppError;
use crate::models::{derive_book_id, Book, BookRow};

const DEFAULT_DESCRIPTION: &str = "Added by user";
const DEFAULT_TOPIC: &str = "Non-Technical";

#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub technical_level: Option<String>,
    pub publication_year: Option<i64>,
    pub page_count: Option<i64>,
}

/// All books with their derived average rating, ordered by title.
/// This order is the "retrieval order" recommendation ties fall back to.
pub async fn list_books(pool: &SqlitePool) -> Result<Vec<Book>, AppError> {
    let query = format!(
        "SELECT {BOOK_COLUMNS} FROM books b \
         LEFT JOIN ratings r ON r.book_id = b.id \
         GROUP BY b.id ORDER BY b.title, b.id"
    );
    let rows: Vec<BookRow> = sqlx::query_as(&query).fetch_all(pool).await?;
    Ok(rows.into_iter().map(Book::from).collect())
}

pub async fn find_book(pool: &SqlitePool, id: &str) -> Result<Option<Book>, AppError> {
    let query = format!(
        "SELECT {BOOK_COLUMNS} FROM books b \
         LEFT JOIN ratings r ON r.book_id = b.id \
         WHERE b.id = ? GROUP BY b.id"
    );
    let row: Option<BookRow> = sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Book::from))
}

pub async fn get_book(pool: &SqlitePool, id: &str) -> Result<Book, AppError> {
    find_book(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {id} not found")))
}

pub async fn book_exists(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Inserts a book under its derived id. The same title/author pair cannot be added twice.
pub async fn add_book(pool: &SqlitePool, new_book: NewBook) -> Result<Book, AppError> {
    let title = require_non_blank("title", &new_book.title)?;
    let author = require_non_blank("author", &new_book.author)?;

    if let Some(year) = new_book.publication_year {
        if year <= 0 {
            return Err(AppError::Validation(format!(
                "publication_year must be positive, got {year}"
            )));
        }
    }
    if let Some(pages) = new_book.page_count {
        if pages < 0 {
            return Err(AppError::Validation(format!(
                "page_count cannot be negative, got {pages}"
            )));
        }
    }

    let id = derive_book_id(&title, &author);
    if book_exists(pool, &id).await? {
        return Err(AppError::Validation("Book already exists".to_string()));
    }

    let description = new_book
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let mut topics = normalize_topics(new_book.topics);
    if topics.is_empty() {
        topics.push(DEFAULT_TOPIC.to_string());
    }
    let topics_json = serde_json::to_string(&topics)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize topics: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO books
            (id, title, author, description, topics, technical_level, publication_year, page_count)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&title)
    .bind(&author)
    .bind(&description)
    .bind(&topics_json)
    .bind(&new_book.technical_level)
    .bind(new_book.publication_year)
    .bind(new_book.page_count)
    .execute(pool)
    .await
    .map_err(|e| unique_violation_as(e, "Book already exists"))?;

    info!("Added book {id}: {title} by {author}");

    get_book(pool, &id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::new_book;
    use crate::db::memory_pool;

    #[tokio::test]
    async fn test_add_book_derives_id_and_defaults() {
        let pool = memory_pool().await;
        let book = add_book(&pool, new_book("SICP", "Abelson", &[])).await.unwrap();

        assert_eq!(book.id, derive_book_id("SICP", "Abelson"));
        assert_eq!(book.description, DEFAULT_DESCRIPTION);
        assert_eq!(book.topics, vec![DEFAULT_TOPIC]);
        assert_eq!(book.average_rating, 0.0);
        assert_eq!(book.rating_count, 0);
    }

    #[tokio::test]
    async fn test_add_book_twice_is_rejected() {
        let pool = memory_pool().await;
        add_book(&pool, new_book("SICP", "Abelson", &["Lisp"])).await.unwrap();

        let err = add_book(&pool, new_book("SICP", "Abelson", &["Scheme"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("already exists")));
    }

    #[tokio::test]
    async fn test_add_book_requires_title() {
        let pool = memory_pool().await;
        let err = add_book(&pool, new_book("  ", "Anon", &[])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_books_orders_by_title() {
        let pool = memory_pool().await;
        add_book(&pool, new_book("Zero to One", "Thiel", &[])).await.unwrap();
        add_book(&pool, new_book("Algorithms", "Sedgewick", &[])).await.unwrap();

        let titles: Vec<String> = list_books(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Algorithms", "Zero to One"]);
    }

    #[tokio::test]
    async fn test_get_book_unknown_is_not_found() {
        let pool = memory_pool().await;
        let err = get_book(&pool, "0000000000000000").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
