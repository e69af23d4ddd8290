use sqlx::PgPool;

use crate::error::AppError;
use crate::models::Booking;

const BOOKING_COLUMNS: &str = "id, show_id, seat_ids, user_id, user_name, booked_at";

/// Orchestrates the booking and cancellation transactions. This is the only
/// component that mutates seat state, and it only ever does so inside a
/// transaction that also writes the bookings table.
#[derive(Clone)]
pub struct ReservationService {
    pool: PgPool,
}

impl ReservationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically claims `seat_ids` for `show_id` and records the booking.
    ///
    /// Each seat is claimed with a conditional update (`is_booked = FALSE`
    /// in the WHERE clause), so two transactions racing for the same seat
    /// cannot both see it free: whichever commits first wins and the loser
    /// rolls back having changed nothing. A plain read-then-write check
    /// here would leave a window between validation and the write during
    /// which a concurrent booking could slip in.
    pub async fn book_tickets(
        &self,
        show_id: i64,
        seat_ids: &[i64],
        user_id: i64,
        user_name: &str,
    ) -> Result<Booking, AppError> {
        if seat_ids.is_empty() {
            return Err(AppError::Validation("seat_ids must not be empty".to_string()));
        }

        // Claim in ascending id order so two requests with overlapping seat
        // sets always collide on the lowest shared seat instead of
        // deadlocking on each other's locks. Sorting also surfaces
        // duplicates, which would otherwise fail the second claim and get
        // misreported as a conflict.
        let mut ordered: Vec<i64> = seat_ids.to_vec();
        ordered.sort_unstable();
        if ordered.windows(2).any(|w| w[0] == w[1]) {
            return Err(AppError::Validation("seat_ids contains duplicates".to_string()));
        }

        let show_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)"
        )
        .bind(show_id)
        .fetch_one(&self.pool)
        .await?;
        if !show_exists {
            return Err(AppError::ShowNotFound(show_id));
        }

        let mut tx = self.pool.begin().await?;

        for &seat_id in &ordered {
            // The show_id check doubles as a membership test: a seat from
            // another show never matches and the claim fails.
            let claimed = sqlx::query(
                r#"
                UPDATE seats
                SET is_booked = TRUE
                WHERE id = $1 AND show_id = $2 AND is_booked = FALSE
                "#
            )
            .bind(seat_id)
            .bind(show_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if claimed != 1 {
                tx.rollback().await?;
                tracing::debug!("seat {} unavailable for show {}, aborting booking", seat_id, show_id);
                return Err(AppError::SeatNotAvailable);
            }
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (show_id, seat_ids, user_id, user_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(show_id)
        .bind(&ordered)
        .bind(user_id)
        .bind(user_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "booking {} created: show {}, {} seats, user {}",
            booking.id, show_id, booking.seat_ids.len(), user_id
        );
        Ok(booking)
    }

    /// Releases every seat of the booking and deletes it, in one
    /// transaction. Only the owner may cancel.
    pub async fn cancel_booking(&self, booking_id: i64, user_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE serializes concurrent cancels of the same booking; the
        // second one finds the row gone and reports not-found.
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::BookingNotFound(booking_id))?;

        if booking.user_id != user_id {
            tx.rollback().await?;
            return Err(AppError::NotOwner);
        }

        sqlx::query("UPDATE seats SET is_booked = FALSE WHERE id = ANY($1)")
            .bind(&booking.seat_ids)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("booking {} cancelled, {} seats released", booking_id, booking.seat_ids.len());
        Ok(())
    }

    pub async fn list_bookings_by_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }
}
