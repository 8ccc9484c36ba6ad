//! Status endpoint handler.
//!
//! Returns server status information, including uptime, the compute context
//! and the layers on the map.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::ContextInfo;
use crate::map::LayerInfo;
use crate::state::AppState;

/// Server ID, unique per process
static SERVER_ID: once_cell::sync::Lazy<String> =
    once_cell::sync::Lazy::new(|| Uuid::new_v4().to_string());

/// Status response structure
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Server ID (unique per instance)
    pub server_id: String,
    /// Current timestamp (ISO 8601 format)
    pub timestamp: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Compute context summary
    pub context: ContextInfo,
    /// Layers on the map
    pub layers: Vec<LayerInfo>,
    /// Server status
    pub status: String,
}

/// Handle GET /status requests
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(build_status(&state))
}

fn build_status(state: &AppState) -> StatusResponse {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    StatusResponse {
        server_id: SERVER_ID.clone(),
        timestamp,
        uptime_seconds: state.started.elapsed().as_secs(),
        context: state.context.clone(),
        layers: state.map.layers_info(),
        status: "healthy".to_string(),
    }
}
