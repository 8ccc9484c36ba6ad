//! Colormap trait and utilities.
//!
//! This module defines the common interface for all colormaps.

use crate::error::{MusaError, Result};

/// Fully transparent black, used for no-data pixels
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        if !value.is_finite() {
            return TRANSPARENT;
        }
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// Get a colormap by name
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    use super::sequential::{Gray, GradientColormap};

    let colormap: Box<dyn Colormap> = match name.to_lowercase().as_str() {
        "gray" | "grey" => Box::new(Gray),
        "viridis" => Box::new(GradientColormap::new("viridis", &colorgrad::viridis())),
        "plasma" => Box::new(GradientColormap::new("plasma", &colorgrad::plasma())),
        "inferno" => Box::new(GradientColormap::new("inferno", &colorgrad::inferno())),
        "magma" => Box::new(GradientColormap::new("magma", &colorgrad::magma())),
        "cividis" => Box::new(GradientColormap::new("cividis", &colorgrad::cividis())),
        "greens" => Box::new(GradientColormap::new("greens", &colorgrad::greens())),
        "ylgn" => Box::new(GradientColormap::new("ylgn", &colorgrad::yl_gn())),
        "rdylgn" => Box::new(GradientColormap::new("rdylgn", &colorgrad::rd_yl_gn())),
        "ndvi" => Box::new(crate::ndvi::ndvi_color_map()),
        _ => {
            return Err(MusaError::InvalidParameter {
                param: "colormap".to_string(),
                message: format!("Unknown colormap: {}", name),
            })
        }
    };
    Ok(colormap)
}

/// Split a packed 0xRRGGBBAA color into its channels
pub fn unpack_rgba(color: u32) -> [u8; 4] {
    color.to_be_bytes()
}
