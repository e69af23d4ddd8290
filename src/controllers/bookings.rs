use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings", get(list_user_bookings))
        .route("/bookings/{id}", delete(cancel_booking))
}

// POST /api/bookings
#[derive(Debug, Deserialize, Validate)]
struct CreateBookingRequest {
    pub show_id: i64,
    #[validate(length(min = 1, message = "seat_ids must not be empty"))]
    pub seat_ids: Vec<i64>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = state
        .reservations
        .book_tickets(req.show_id, &req.seat_ids, user.user_id, &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings
async fn list_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.reservations.list_bookings_by_user(user.user_id).await?;
    Ok(Json(bookings))
}

// DELETE /api/bookings/{id}
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.reservations.cancel_booking(booking_id, user.user_id).await?;
    Ok(Json(json!({ "message": "Booking cancelled" })))
}
