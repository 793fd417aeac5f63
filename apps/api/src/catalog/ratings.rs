use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::catalog::books::book_exists;
use crate::catalog::validation::validate_rating;
use crate::errors::AppError;
use crate::models::RatingRow;

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub book_id: String,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RatingOutcome {
    pub book_id: String,
    pub rating: i64,
    pub average_rating: f64,
}

/// Mean of a book's rating values; `0.0` for an unrated book.
pub fn average_rating(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

pub async fn get_ratings_by_book(pool: &SqlitePool, book_id: &str) -> Result<Vec<i64>, AppError> {
    let values: Vec<i64> = sqlx::query_scalar("SELECT rating FROM ratings WHERE book_id = ?")
        .bind(book_id)
        .fetch_all(pool)
        .await?;
    Ok(values)
}

pub async fn list_ratings(pool: &SqlitePool) -> Result<Vec<RatingRow>, AppError> {
    let rows = sqlx::query_as::<_, RatingRow>(
        "SELECT id, book_id, rating, timestamp FROM ratings ORDER BY timestamp, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Records the rating for a book, replacing any earlier rating, and returns the recomputed average.
pub async fn upsert_rating(
    pool: &SqlitePool,
    book_id: &str,
    rating: i64,
) -> Result<RatingOutcome, AppError> {
    validate_rating(rating)?;

    if !book_exists(pool, book_id).await? {
        return Err(AppError::NotFound(format!("Book {book_id} not found")));
    }

    sqlx::query(
        r#"
        INSERT INTO ratings (book_id, rating, timestamp)
        VALUES (?, ?, ?)
        ON CONFLICT (book_id) DO UPDATE
            SET rating = excluded.rating,
                timestamp = excluded.timestamp
        "#,
    )
    .bind(book_id)
    .bind(rating)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let average = average_rating(&get_ratings_by_book(pool, book_id).await?);
    info!("Rated book {book_id} {rating}/5 (average now {average:.2})");

    Ok(RatingOutcome {
        book_id: book_id.to_string(),
        rating,
        average_rating: average,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::books::get_book;
    use crate::catalog::test_support::seed_book;
    use crate::db::memory_pool;

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_average_is_arithmetic_mean() {
        assert!((average_rating(&[5, 4, 3]) - 4.0).abs() < f64::EPSILON);
        assert!((average_rating(&[5, 4]) - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_rating_six_is_rejected_and_not_stored() {
        let pool = memory_pool().await;
        let book = seed_book(&pool, "Dune", "Frank Herbert", &["Fiction"]).await;

        let err = upsert_rating(&pool, &book.id, 6).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(get_ratings_by_book(&pool, &book.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_rating_updates_instead_of_duplicating() {
        let pool = memory_pool().await;
        let book = seed_book(&pool, "Dune", "Frank Herbert", &["Fiction"]).await;

        upsert_rating(&pool, &book.id, 2).await.unwrap();
        let outcome = upsert_rating(&pool, &book.id, 4).await.unwrap();

        assert_eq!(outcome.rating, 4);
        assert!((outcome.average_rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(get_ratings_by_book(&pool, &book.id).await.unwrap(), vec![4]);

        let reloaded = get_book(&pool, &book.id).await.unwrap();
        assert_eq!(reloaded.rating_count, 1);
        assert!((reloaded.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_rating_unknown_book_is_not_found() {
        let pool = memory_pool().await;
        let err = upsert_rating(&pool, "ffffffffffffffff", 3).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_ratings_returns_one_row_per_book() {
        let pool = memory_pool().await;
        let a = seed_book(&pool, "A", "X", &[]).await;
        let b = seed_book(&pool, "B", "Y", &[]).await;
        upsert_rating(&pool, &a.id, 5).await.unwrap();
        upsert_rating(&pool, &b.id, 1).await.unwrap();
        upsert_rating(&pool, &a.id, 3).await.unwrap();

        let rows = list_ratings(&pool).await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
