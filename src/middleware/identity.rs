use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sqlx::Row;
use std::sync::Arc;

use crate::api::AppState;
use crate::utils::error::AppError;

pub const AUTH_USER_HEADER: &str = "x-user-id";

// Resolves the requester's identity from an Authorization: Bearer header.
// Requests without credentials proceed anonymously; handlers that need an
// identity enforce that themselves. A present-but-invalid token is rejected
// outright.
pub async fn identity_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Only this middleware may set the identity header; a client-supplied
    // value must not survive.
    request.headers_mut().remove(AUTH_USER_HEADER);

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) else {
        return Ok(next.run(request).await);
    };

    let user_id = state.jwt_service.extract_user_id(token)?;

    // Check the account still exists (not removed since the token was issued)
    let user_exists = sqlx::query("SELECT COUNT(*) as count FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(state.db.as_ref())
        .await
        .map_err(|_| AppError::Internal("Database error during auth check".to_string()))?
        .get::<i64, _>("count");

    if user_exists == 0 {
        return Err(AppError::Auth("User no longer exists".to_string()));
    }

    request.headers_mut().insert(
        AUTH_USER_HEADER,
        user_id
            .to_string()
            .parse()
            .map_err(|_| AppError::Internal("Failed to set identity header".to_string()))?,
    );

    Ok(next.run(request).await)
}
