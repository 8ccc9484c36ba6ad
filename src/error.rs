//! Error types for musa.
//!
//! A single error enum covers every failure the helpers can report. Library
//! functions propagate these unchanged; nothing is retried.

use thiserror::Error;

/// The main error type for musa operations.
#[derive(Error, Debug)]
pub enum MusaError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Compute context construction errors
    #[error("Compute context error: {message}")]
    Context { message: String },

    /// Malformed or degenerate bounds
    #[error("Invalid bounds: {message}")]
    InvalidBounds { message: String },

    /// CRS descriptors that cannot be parsed or exported
    #[error("Invalid CRS: {message}")]
    InvalidCrs { message: String },

    /// Coordinate transformation failures
    #[error("Projection error: {message}")]
    Projection { message: String },

    /// Bands or arrays whose shapes disagree
    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// Color map construction errors
    #[error("Invalid color map: {message}")]
    InvalidColorMap { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// A crop name that maps to more than one CDL code
    #[error("Ambiguous crop name '{name}': used by codes {codes:?}")]
    AmbiguousCropName { name: String, codes: Vec<u16> },

    /// Requests for layers or tiles that do not exist
    #[error("Tile not found: {message}")]
    TileNotFound { message: String },

    /// Server errors
    #[error("Server error: {message}")]
    Server { message: String },
}

impl MusaError {
    /// Short variant name used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            MusaError::Io(_) => "io",
            MusaError::Image(_) => "image",
            MusaError::Json(_) => "json",
            MusaError::Config { .. } => "config",
            MusaError::Context { .. } => "context",
            MusaError::InvalidBounds { .. } => "invalid_bounds",
            MusaError::InvalidCrs { .. } => "invalid_crs",
            MusaError::Projection { .. } => "projection",
            MusaError::ShapeMismatch { .. } => "shape_mismatch",
            MusaError::InvalidColorMap { .. } => "invalid_color_map",
            MusaError::InvalidParameter { .. } => "invalid_parameter",
            MusaError::AmbiguousCropName { .. } => "ambiguous_crop_name",
            MusaError::TileNotFound { .. } => "tile_not_found",
            MusaError::Server { .. } => "server",
        }
    }
}

/// Convenience type alias for Results with MusaError
pub type Result<T> = std::result::Result<T, MusaError>;
