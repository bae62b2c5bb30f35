pub mod auth;
pub mod categories;
pub mod servers;

use axum::Router;
use std::sync::Arc;

pub use auth::AppState;

pub fn routes(state: Arc<AppState>) -> Router {
    let directory_routes = Router::new()
        .nest("/server", servers::routes(state.clone()))
        .nest("/category", categories::routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::identity::identity_middleware,
        ));

    Router::new()
        .nest("/auth", auth::routes(state))
        .merge(directory_routes)
}
