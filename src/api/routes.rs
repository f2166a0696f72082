use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::AuthService;
use crate::storage::Storage;

use super::handlers::{
    delete_url, get_analytics, health_check, shorten_url, user_links, AppState,
};

pub fn create_api_router(
    storage: Arc<dyn Storage>,
    auth: Arc<AuthService>,
    base_url: String,
) -> Router {
    let state = Arc::new(AppState {
        storage,
        auth,
        base_url,
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/shorten", post(shorten_url))
        .route("/analytics/{short_id}", get(get_analytics))
        .route("/user/links/{owner_id}", get(user_links))
        .route("/{short_id}", delete(delete_url))
        .with_state(state)
}
