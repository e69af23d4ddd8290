use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("show {0} not found")]
    ShowNotFound(i64),

    #[error("booking {0} not found")]
    BookingNotFound(i64),

    #[error("seat not available")]
    SeatNotAvailable,

    #[error("not the booking owner")]
    NotOwner,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ShowNotFound(_) | AppError::BookingNotFound(_) => StatusCode::NOT_FOUND,
            AppError::SeatNotAvailable => StatusCode::CONFLICT,
            AppError::NotOwner => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ShowNotFound(_) => "SHOW_NOT_FOUND",
            AppError::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            AppError::SeatNotAvailable => "SEAT_NOT_AVAILABLE",
            AppError::NotOwner => "NOT_OWNER",
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }

    // Infrastructure failures may succeed on retry; everything else is a
    // problem with the request itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Database(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Driver details stay in the logs, not in the response body.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
