use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub movie_id: i64,
    pub theater_id: i64,
    pub show_time: DateTime<Utc>,
    pub total_seats: i32,
}
