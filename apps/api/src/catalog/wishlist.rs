use chrono::Utc;
use serde::Deserialize;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::catalog::books::book_exists;
use crate::catalog::{unique_violation_as, BOOK_COLUMNS};
use crate::errors::AppError;
use crate::models::{BookRow, WishlistEntry, WishlistRow};

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub book_id: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WishlistOrder {
    pub book_id: String,
    pub order: i64,
}

#[derive(FromRow)]
struct WishlistBookRow {
    #[sqlx(flatten)]
    entry: WishlistRow,
    #[sqlx(flatten)]
    book: BookRow,
}

/// Wishlist entries in presentation order: `display_order`, newest first on ties.
pub async fn list_wishlist(pool: &SqlitePool) -> Result<Vec<WishlistEntry>, AppError> {
    let query = format!(
        "SELECT w.book_id, w.display_order, w.notes, w.timestamp, {BOOK_COLUMNS} \
         FROM wishlist w \
         JOIN books b ON b.id = w.book_id \
         LEFT JOIN ratings r ON r.book_id = b.id \
         GROUP BY w.id \
         ORDER BY w.display_order, w.timestamp DESC"
    );
    let rows: Vec<WishlistBookRow> = sqlx::query_as(&query).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|r| WishlistEntry::from_parts(r.entry, r.book))
        .collect())
}

/// Appends a book to the end of the wishlist.
pub async fn insert_wishlist_entry(
    pool: &SqlitePool,
    book_id: &str,
    notes: Option<String>,
) -> Result<WishlistRow, AppError> {
    if !book_exists(pool, book_id).await? {
        return Err(AppError::NotFound(format!("Book {book_id} not found")));
    }

    let already: Option<i64> = sqlx::query_scalar("SELECT id FROM wishlist WHERE book_id = ?")
        .bind(book_id)
        .fetch_optional(pool)
        .await?;
    if already.is_some() {
        return Err(AppError::Validation("Book already in wishlist".to_string()));
    }

    let max_order: Option<i64> = sqlx::query_scalar("SELECT MAX(display_order) FROM wishlist")
        .fetch_one(pool)
        .await?;
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    let row = WishlistRow {
        book_id: book_id.to_string(),
        display_order: max_order.unwrap_or(0) + 1,
        notes,
        timestamp: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO wishlist (book_id, display_order, notes, timestamp) VALUES (?, ?, ?, ?)",
    )
    .bind(&row.book_id)
    .bind(row.display_order)
    .bind(&row.notes)
    .bind(row.timestamp)
    .execute(pool)
    .await
    .map_err(|e| unique_violation_as(e, "Book already in wishlist"))?;

    info!("Added book {book_id} to wishlist at position {}", row.display_order);
    Ok(row)
}

pub async fn remove_wishlist_entry(pool: &SqlitePool, book_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM wishlist WHERE book_id = ?")
        .bind(book_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Book {book_id} not found in wishlist"
        )));
    }

    info!("Removed book {book_id} from wishlist");
    Ok(())
}

/// Applies new display positions in one transaction.
/// If any book is not on the wishlist nothing is changed.
pub async fn reorder_wishlist(pool: &SqlitePool, orders: &[WishlistOrder]) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    for item in orders {
        let result = sqlx::query("UPDATE wishlist SET display_order = ? WHERE book_id = ?")
            .bind(item.order)
            .bind(&item.book_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back the updates already applied.
            return Err(AppError::NotFound(format!(
                "Book {} not found in wishlist",
                item.book_id
            )));
        }
    }

    tx.commit().await?;
    info!("Reordered {} wishlist entries", orders.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::seed_book;
    use crate::db::memory_pool;

    fn ids(entries: &[WishlistEntry]) -> Vec<String> {
        entries.iter().map(|e| e.book.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_entries_append_in_order() {
        let pool = memory_pool().await;
        let a = seed_book(&pool, "A", "X", &[]).await;
        let b = seed_book(&pool, "B", "Y", &[]).await;

        let first = insert_wishlist_entry(&pool, &b.id, Some("gift idea".into()))
            .await
            .unwrap();
        let second = insert_wishlist_entry(&pool, &a.id, None).await.unwrap();
        assert_eq!(first.display_order, 1);
        assert_eq!(second.display_order, 2);

        let entries = list_wishlist(&pool).await.unwrap();
        assert_eq!(ids(&entries), vec![b.id.clone(), a.id.clone()]);
        assert_eq!(entries[0].notes.as_deref(), Some("gift idea"));
    }

    #[tokio::test]
    async fn test_duplicate_entry_is_rejected() {
        let pool = memory_pool().await;
        let a = seed_book(&pool, "A", "X", &[]).await;
        insert_wishlist_entry(&pool, &a.id, None).await.unwrap();

        let err = insert_wishlist_entry(&pool, &a.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reorder_changes_presentation() {
        let pool = memory_pool().await;
        let a = seed_book(&pool, "A", "X", &[]).await;
        let b = seed_book(&pool, "B", "Y", &[]).await;
        insert_wishlist_entry(&pool, &a.id, None).await.unwrap();
        insert_wishlist_entry(&pool, &b.id, None).await.unwrap();

        reorder_wishlist(
            &pool,
            &[
                WishlistOrder { book_id: a.id.clone(), order: 2 },
                WishlistOrder { book_id: b.id.clone(), order: 1 },
            ],
        )
        .await
        .unwrap();

        assert_eq!(ids(&list_wishlist(&pool).await.unwrap()), vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_reorder_with_unknown_entry_changes_nothing() {
        let pool = memory_pool().await;
        let a = seed_book(&pool, "A", "X", &[]).await;
        let b = seed_book(&pool, "B", "Y", &[]).await;
        insert_wishlist_entry(&pool, &a.id, None).await.unwrap();
        insert_wishlist_entry(&pool, &b.id, None).await.unwrap();

        let err = reorder_wishlist(
            &pool,
            &[
                WishlistOrder { book_id: a.id.clone(), order: 9 },
                WishlistOrder { book_id: "missing".into(), order: 1 },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(ids(&list_wishlist(&pool).await.unwrap()), vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_remove_missing_entry_is_not_found() {
        let pool = memory_pool().await;
        let a = seed_book(&pool, "A", "X", &[]).await;
        insert_wishlist_entry(&pool, &a.id, None).await.unwrap();

        remove_wishlist_entry(&pool, &a.id).await.unwrap();
        let err = remove_wishlist_entry(&pool, &a.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
