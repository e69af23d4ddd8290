use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::services::shows::NewShow;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", post(create_show))
        .route("/shows", get(list_shows))
        .route("/shows/search", get(search_shows))
        .route("/shows/{id}", get(get_show))
        .route("/shows/{id}/seats", get(list_available_seats))
}

// POST /api/shows
#[derive(Debug, Deserialize, Validate)]
struct CreateShowRequest {
    pub movie_id: i64,
    pub theater_id: i64,
    pub show_time: DateTime<Utc>,
    #[validate(range(min = 1, message = "total_seats must be at least 1"))]
    pub total_seats: i32,
}

async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateShowRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let show = state
        .shows
        .create_show(NewShow {
            movie_id: req.movie_id,
            theater_id: req.theater_id,
            show_time: req.show_time,
            total_seats: req.total_seats,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(show)))
}

// GET /api/shows
async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let shows = state.shows.list_shows().await?;
    Ok(Json(shows))
}

// GET /api/shows/search
#[derive(Debug, Deserialize)]
struct SearchShowsQuery {
    movie_id: Option<i64>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

async fn search_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchShowsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let shows = state
        .shows
        .search_shows(params.movie_id, params.start_time, params.end_time)
        .await?;
    Ok(Json(shows))
}

// GET /api/shows/{id}
async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let show = state.shows.get_show(id).await?;
    Ok(Json(show))
}

// GET /api/shows/{id}/seats
async fn list_available_seats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let seats = state.seats.list_available(id).await?;
    Ok(Json(seats))
}
