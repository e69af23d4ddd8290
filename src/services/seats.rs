use sqlx::PgPool;

use crate::error::AppError;
use crate::models::Seat;

/// Read side of the seat inventory. All writes to seat state go through
/// the reservation engine's transactions.
#[derive(Clone)]
pub struct SeatService {
    pool: PgPool,
}

impl SeatService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unbooked seats for a show, ordered by seat id so callers see a
    /// stable listing between calls.
    pub async fn list_available(&self, show_id: i64) -> Result<Vec<Seat>, AppError> {
        let show_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)"
        )
        .bind(show_id)
        .fetch_one(&self.pool)
        .await?;
        if !show_exists {
            return Err(AppError::ShowNotFound(show_id));
        }

        let seats = sqlx::query_as::<_, Seat>(
            "SELECT id, show_id, seat_number, is_booked
             FROM seats
             WHERE show_id = $1 AND is_booked = FALSE
             ORDER BY id"
        )
        .bind(show_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(seats)
    }
}
