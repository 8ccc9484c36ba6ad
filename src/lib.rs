//! # musa
//!
//! Helpers for geospatial raster visualization and analysis.
//!
//! This library computes vegetation indices from raster bands, renders them as
//! web-mercator tile layers on an interactive map, reprojects vector
//! geometries, displays arrays and histograms, and looks up USDA Cropland
//! Data Layer categories.
//!
//! ## Architecture
//!
//! - **Compute context**: a process-wide worker pool, created on first use
//! - **Tiling engine**: re-tiles rasters onto the global layout, builds
//!   pyramids and renders PNG tiles
//! - **Map and server**: named tile layers served over HTTP

pub mod cdl;
pub mod colormaps;
pub mod config;
pub mod context;
pub mod crs;
pub mod data_loader;
pub mod display;
pub mod error;
pub mod geometry;
pub mod handlers;
pub mod interpolation;
pub mod logging;
pub mod map;
pub mod ndvi;
pub mod raster;
pub mod state;
pub mod tiling;
pub mod wkt;

pub use cdl::{
    ambiguous_crop_names, cdl_values_to_crops, crop_code, crop_codes, crop_name,
    crops_to_cdl_values,
};
pub use config::Config;
pub use context::{init_context, init_context_with, ComputeContext};
pub use crs::Crs;
pub use display::{show_histogram, show_image, Display, Histogram};
pub use error::{MusaError, Result};
pub use geometry::{bounds_to_polygon, reproject_geom};
pub use logging::{
    create_http_trace_layer, generate_request_id, init_tracing, log_error, log_layer_stats,
    log_operation_end, log_operation_start, log_request_error, log_timed_operation,
};
pub use map::{InteractiveMap, LayerInfo};
pub use ndvi::{compute_ndvi, map_ndvi, map_ndvi_with, ndvi_color_map};
pub use raster::{Bounds, ProjectedExtent};
pub use state::AppState;
