use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use std::sync::Arc;

use crate::database::DbPool;
use crate::services::auth::{LoginRequest, login_user};
use crate::utils::error::AppResult;
use crate::utils::helpers::json_response;
use crate::utils::jwt::JwtService;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: Arc<JwtService>,
}

async fn health_check() -> &'static str {
    "OK"
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let response = login_user(&state.db, payload, &state.jwt_service).await?;
    Ok(json_response(&response))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .with_state(state)
}
