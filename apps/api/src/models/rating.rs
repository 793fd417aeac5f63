use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RatingRow {
    pub id: i64,
    pub book_id: String,
    pub rating: i64,
    pub timestamp: DateTime<Utc>,
}

