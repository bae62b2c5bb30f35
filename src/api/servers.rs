use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::services::directory::{ServerSelection, select_servers};
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::{extract_user_id, json_list};
use crate::utils::validation::{parse_quantity, parse_server_id};

#[derive(Deserialize)]
struct SelectParams {
    category: Option<String>,
    qty: Option<String>,
    by_user: Option<String>,
    by_serverid: Option<String>,
    with_num_members: Option<String>,
}

// An empty value means the caller left the parameter off.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn is_true(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

async fn select(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SelectParams>,
) -> AppResult<Json<Vec<serde_json::Value>>> {
    let category = present(params.category);
    let qty = present(params.qty);
    let by_serverid = present(params.by_serverid);
    let by_user = is_true(&params.by_user);
    let with_num_members = is_true(&params.with_num_members);

    let user_id = extract_user_id(&headers);

    if (by_user || by_serverid.is_some()) && user_id.is_none() {
        return Err(AppError::Auth(
            "Authentication required to filter by user or server id".to_string(),
        ));
    }

    let selection = ServerSelection {
        category,
        quantity: qty.as_deref().map(parse_quantity).transpose()?,
        member_user_id: if by_user { user_id } else { None },
        server_id: by_serverid.as_deref().map(parse_server_id).transpose()?,
        with_num_members,
    };

    let servers = select_servers(&state.db, &selection).await?;

    Ok(json_list(servers))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/select", get(select))
        .with_state(state)
}
