//! musa - NDVI tile server
//!
//! Loads a red and a near-infrared band, renders their NDVI as a tile layer
//! and serves it over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tracing::{error, info};

use musa::context::init_context_with;
use musa::data_loader::load_bands;
use musa::handlers::build_router;
use musa::ndvi::{compute_ndvi, map_ndvi_with, NDVI_LAYER};
use musa::{
    init_tracing, log_error, log_layer_stats, log_operation_end, log_operation_start,
    log_timed_operation, AppState, Bounds, Config, Crs, InteractiveMap, MusaError, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let (config, args) = Config::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level)?;
    info!("Starting musa v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let bounds: Bounds = args.bounds.parse().map_err(|e| {
        error!("Invalid bounds: {}", e);
        e
    })?;
    let crs: Crs = args.crs.parse().map_err(|e| {
        error!("Invalid CRS: {}", e);
        e
    })?;

    let context = init_context_with(&config.compute)?;

    // Load the bands and render the NDVI layer
    let start = Instant::now();
    log_operation_start("render_ndvi", Some(&format!("red={:?} nir={:?}", args.red, args.nir)));

    let (red, nir) = load_bands(&args.red, &args.nir).map_err(|e| {
        log_error(&e, "load_bands");
        e
    })?;
    let ndvi = log_timed_operation("compute_ndvi", || compute_ndvi(red.view(), nir.view()))?;

    let map = Arc::new(InteractiveMap::new());
    map_ndvi_with(context, &config.tiling, &map, ndvi.view(), bounds, &crs).map_err(|e| {
        log_error(&e, "map_ndvi");
        e
    })?;
    log_operation_end("render_ndvi", start, true);

    if let Some(service) = map.layer(NDVI_LAYER) {
        let pyramid = service.pyramid();
        log_layer_stats(
            NDVI_LAYER,
            pyramid.min_zoom(),
            pyramid.max_zoom(),
            pyramid.base().map(|base| base.len()).unwrap_or(0),
            service.value_range(),
        );
    }

    let state = AppState::new_shared(config.clone(), map, context);
    let app = build_router(state);

    // Create the server address
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|e| MusaError::Config {
                message: format!("Invalid host address: {}", e),
            })?,
        config.server.port,
    ));

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MusaError::Server {
            message: format!("Failed to bind to address: {}", e),
        })?;

    info!("Server is ready to accept connections");

    // Start the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MusaError::Server {
            message: format!("Server error: {}", e),
        })?;

    info!("Server has been gracefully shut down");
    Ok(())
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
