use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::catalog::books::book_exists;
use crate::errors::AppError;

/// Marks a book as never to be recommended again. Dismissing twice is a no-op.
pub async fn insert_dismissed(pool: &SqlitePool, book_id: &str) -> Result<(), AppError> {
    if !book_exists(pool, book_id).await? {
        return Err(AppError::NotFound(format!("Book {book_id} not found")));
    }

    let result = sqlx::query(
        "INSERT INTO dismissed_books (book_id, timestamp) VALUES (?, ?) \
         ON CONFLICT (book_id) DO NOTHING",
    )
    .bind(book_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!("Dismissed book {book_id}");
    }
    Ok(())
}

pub async fn list_dismissed_ids(pool: &SqlitePool) -> Result<Vec<String>, AppError> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT book_id FROM dismissed_books ORDER BY timestamp, id")
            .fetch_all(pool)
            .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::seed_book;
    use crate::db::memory_pool;

    #[tokio::test]
    async fn test_dismiss_is_idempotent() {
        let pool = memory_pool().await;
        let book = seed_book(&pool, "Twilight", "Stephenie Meyer", &["Romance"]).await;

        insert_dismissed(&pool, &book.id).await.unwrap();
        insert_dismissed(&pool, &book.id).await.unwrap();

        assert_eq!(list_dismissed_ids(&pool).await.unwrap(), vec![book.id]);
    }

    #[tokio::test]
    async fn test_dismiss_unknown_book_is_not_found() {
        let pool = memory_pool().await;
        let err = insert_dismissed(&pool, "0123456789abcdef").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
