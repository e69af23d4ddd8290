use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

/// Authenticated identity resolved before any booking logic runs. The
/// reservation engine only ever sees the opaque `user_id`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

// Basic Auth extractor
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let encoded = auth_header
            .strip_prefix("Basic ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let credentials = String::from_utf8(decoded)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let mut parts_iter = credentials.splitn(2, ':');
        let email = parts_iter.next().ok_or(StatusCode::UNAUTHORIZED)?;
        let password = parts_iter.next().ok_or(StatusCode::UNAUTHORIZED)?;

        let user = crate::models::User::find_by_email(email, &state.db)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if !user.verify_password(password) {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}
