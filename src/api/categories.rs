use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;

use crate::api::AppState;
use crate::models::category::Category;
use crate::utils::error::AppResult;
use crate::utils::helpers::json_list;

async fn select(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<serde_json::Value>>> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
        .fetch_all(state.db.as_ref())
        .await?;

    Ok(json_list(categories))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/select", get(select))
        .with_state(state)
}
