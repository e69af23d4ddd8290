use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::Show;

#[derive(Clone)]
pub struct ShowService {
    pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct NewShow {
    pub movie_id: i64,
    pub theater_id: i64,
    pub show_time: DateTime<Utc>,
    pub total_seats: i32,
}

impl ShowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the show and provisions its full seat set in one
    /// transaction. If seat creation fails the show insert rolls back with
    /// it; a show with a partial seat map must never exist.
    pub async fn create_show(&self, new_show: NewShow) -> Result<Show, AppError> {
        if new_show.total_seats < 1 {
            return Err(AppError::Validation("total_seats must be at least 1".to_string()));
        }
        if new_show.show_time <= Utc::now() {
            return Err(AppError::Validation("show_time must be in the future".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let show = sqlx::query_as::<_, Show>(
            "INSERT INTO shows (movie_id, theater_id, show_time, total_seats)
             VALUES ($1, $2, $3, $4)
             RETURNING id, movie_id, theater_id, show_time, total_seats"
        )
        .bind(new_show.movie_id)
        .bind(new_show.theater_id)
        .bind(new_show.show_time)
        .bind(new_show.total_seats)
        .fetch_one(&mut *tx)
        .await?;

        // Seats are labeled Seat_1 .. Seat_N in one statement.
        sqlx::query(
            r#"
            INSERT INTO seats (show_id, seat_number, is_booked)
            SELECT $1, 'Seat_' || n, FALSE
            FROM generate_series(1, $2) AS n
            "#
        )
        .bind(show.id)
        .bind(new_show.total_seats)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("show {} created with {} seats", show.id, show.total_seats);
        Ok(show)
    }

    pub async fn get_show(&self, id: i64) -> Result<Show, AppError> {
        sqlx::query_as::<_, Show>(
            "SELECT id, movie_id, theater_id, show_time, total_seats FROM shows WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ShowNotFound(id))
    }

    pub async fn list_shows(&self) -> Result<Vec<Show>, AppError> {
        let shows = sqlx::query_as::<_, Show>(
            "SELECT id, movie_id, theater_id, show_time, total_seats FROM shows ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(shows)
    }

    pub async fn search_shows(
        &self,
        movie_id: Option<i64>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<Show>, AppError> {
        let shows = sqlx::query_as::<_, Show>(
            r#"
            SELECT id, movie_id, theater_id, show_time, total_seats
            FROM shows
            WHERE ($1::BIGINT IS NULL OR movie_id = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR show_time >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR show_time <= $3)
            ORDER BY show_time
            "#
        )
        .bind(movie_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_all(&self.pool)
        .await?;
        Ok(shows)
    }
}
