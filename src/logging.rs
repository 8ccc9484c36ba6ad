//! Logging utilities for musa.
//!
//! Structured `tracing` helpers shared by the library and the tile server.

use std::time::Instant;
use tracing::{debug, error, info, warn, Level};

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use uuid::Uuid;

use crate::error::{MusaError, Result};

/// Request/response tracing for the tile server.
///
/// Spans are opened at INFO with the request headers; tile responses are
/// frequent, so they are only reported at DEBUG with microsecond latency.
pub fn create_http_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::DEBUG)
                .latency_unit(LatencyUnit::Micros),
        )
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| MusaError::Config {
            message: format!("Failed to install tracing subscriber: {}", e),
        })
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration = start_time.elapsed();
    let duration_ms = duration.as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Run a fallible step, logging its duration and, on failure, the error
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    debug!(
        operation = operation,
        request_id = %request_id,
        "Starting operation"
    );

    let result = f();
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(_) => info!(
            operation = operation,
            request_id = %request_id,
            duration_ms = duration_ms,
            "Operation completed"
        ),
        Err(e) => log_error(e, operation),
    }

    result
}

/// Log a summary of a rendered map layer
pub fn log_layer_stats(
    layer: &str,
    min_zoom: u8,
    max_zoom: u8,
    base_tiles: usize,
    value_range: (f64, f64),
) {
    info!(
        operation = "layer_ready",
        layer = layer,
        min_zoom = min_zoom,
        max_zoom = max_zoom,
        base_tiles = base_tiles,
        value_min = value_range.0,
        value_max = value_range.1,
        "Map layer ready"
    );
}

/// Log an error with context
pub fn log_error(error: &MusaError, context: &str) {
    error!(
        error = %error,
        context = context,
        kind = error.kind(),
        "Error occurred"
    );
}

/// Log an error that occurred during request processing
pub fn log_request_error(
    error: &MusaError,
    endpoint: &str,
    request_id: &str,
    params: Option<&str>,
) {
    error!(
        error = %error,
        endpoint = endpoint,
        request_id = request_id,
        params = params.unwrap_or("none"),
        kind = error.kind(),
        "Request processing error"
    );
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
