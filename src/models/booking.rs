use serde::Serialize;
use sqlx::FromRow;
use chrono::{DateTime, Utc};

// seat_ids is stored as BIGINT[]; the seats themselves stay owned by the
// show, a booking only holds their ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: i64,
    pub show_id: i64,
    pub seat_ids: Vec<i64>,
    pub user_id: i64,
    pub user_name: String,
    pub booked_at: DateTime<Utc>,
}
