//! HTTP request handlers for the musa tile server.
//!
//! This module contains all the endpoint handlers for the web server.

pub mod status;
pub mod tiles;

pub use status::status_handler;
pub use tiles::{layers_handler, tile_handler};

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::logging::create_http_trace_layer;
use crate::state::AppState;

/// Build the tile server router; `/status` is mounted only when the UI is on
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/layers", get(layers_handler))
        .route("/tiles/:layer/:z/:x/:y", get(tile_handler));

    if state.ui_enabled() {
        router = router.route("/status", get(status_handler));
    }

    router
        .layer(create_http_trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
