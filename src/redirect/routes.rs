use axum::{routing::get, Router};
use std::sync::Arc;

use crate::geo::GeoResolver;
use crate::storage::Storage;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(storage: Arc<dyn Storage>, resolver: Arc<GeoResolver>) -> Router {
    let state = Arc::new(RedirectState { storage, resolver });

    Router::new()
        .route("/{short_id}", get(redirect_url))
        .with_state(state)
}
