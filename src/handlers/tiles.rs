//! Tile endpoint handlers.
//!
//! `GET /layers` lists the map layers and `GET /tiles/{layer}/{z}/{x}/{y}.png`
//! returns one rendered tile.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{MusaError, Result};
use crate::logging::{generate_request_id, log_request_error};
use crate::map::LayerInfo;
use crate::state::AppState;

/// Handle GET /layers requests
pub async fn layers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<LayerInfo>> {
    let layers = state.map.layers_info();
    debug!(endpoint = "/layers", layers = layers.len(), "Listing layers");
    Json(layers)
}

/// Handle GET /tiles/{layer}/{z}/{x}/{y}.png requests
pub async fn tile_handler(
    State(state): State<Arc<AppState>>,
    Path((layer, z, x, y)): Path<(String, u8, u32, String)>,
) -> Response {
    let request_id = generate_request_id();
    let start_time = Instant::now();
    let endpoint = "/tiles";

    debug!(
        endpoint = endpoint,
        request_id = %request_id,
        layer = %layer,
        z = z,
        x = x,
        y = %y,
        "Processing tile request"
    );

    match render_tile(&state, &layer, z, x, &y).await {
        Ok(png) => {
            info!(
                endpoint = endpoint,
                request_id = %request_id,
                layer = %layer,
                z = z,
                x = x,
                y = %y,
                bytes = png.len(),
                duration_us = start_time.elapsed().as_micros() as u64,
                "Tile request successful"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "image/png")],
                Bytes::from(png),
            )
                .into_response()
        }
        Err(error) => {
            let params = format!("layer={} z={} x={} y={}", layer, z, x, y);
            log_request_error(&error, endpoint, &request_id, Some(&params));

            let status = match error {
                MusaError::TileNotFound { .. } => StatusCode::NOT_FOUND,
                MusaError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            (
                status,
                Json(serde_json::json!({
                    "error": error.to_string(),
                    "request_id": request_id
                })),
            )
                .into_response()
        }
    }
}

/// Render a tile to PNG bytes; tiles without data are `TileNotFound`.
///
/// Resampling and PNG encoding run on the blocking pool.
async fn render_tile(state: &AppState, layer: &str, z: u8, x: u32, y: &str) -> Result<Vec<u8>> {
    let row = parse_tile_row(y)?;
    let service = state.get_layer_checked(layer)?;

    let png = tokio::task::spawn_blocking(move || service.render_png(z, x, row))
        .await
        .map_err(|e| MusaError::Server {
            message: format!("Tile rendering task failed: {}", e),
        })??;

    png.ok_or_else(|| MusaError::TileNotFound {
        message: format!("Layer {} has no data at {}/{}/{}", layer, z, x, row),
    })
}

/// Parse the trailing path segment, with or without the `.png` suffix
fn parse_tile_row(segment: &str) -> Result<u32> {
    let digits = segment.strip_suffix(".png").unwrap_or(segment);
    digits.parse().map_err(|_| MusaError::InvalidParameter {
        param: "y".to_string(),
        message: format!("Invalid tile row: {}", segment),
    })
}
