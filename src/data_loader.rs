//! Raster band loading.
//!
//! Reads single-band rasters from any format the `image` crate decodes and
//! converts them into arrays for NDVI computation.

use ndarray::Array2;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{MusaError, Result};

/// Load a single-band raster as 16-bit samples, row 0 at the top
pub fn load_band(path: &Path) -> Result<Array2<u16>> {
    if !path.exists() {
        return Err(MusaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let img = image::open(path)?;
    debug!(
        path = %path.display(),
        color = ?img.color(),
        "Decoded raster"
    );
    if img.color().has_color() {
        return Err(MusaError::InvalidParameter {
            param: "band".to_string(),
            message: format!("{} is not a single-band raster", path.display()),
        });
    }

    let luma = img.to_luma16();
    let (width, height) = luma.dimensions();
    let band = Array2::from_shape_vec((height as usize, width as usize), luma.into_raw())
        .map_err(|e| MusaError::InvalidParameter {
            param: "band".to_string(),
            message: format!("Unexpected raster layout in {}: {}", path.display(), e),
        })?;

    info!(
        operation = "load_band",
        path = %path.display(),
        rows = height,
        cols = width,
        "Band loaded"
    );
    Ok(band)
}

/// Load a red and a near-infrared band, which must share a shape
pub fn load_bands(red: &Path, nir: &Path) -> Result<(Array2<u16>, Array2<u16>)> {
    let red_band = load_band(red)?;
    let nir_band = load_band(nir)?;
    if red_band.dim() != nir_band.dim() {
        return Err(MusaError::ShapeMismatch {
            left: red_band.shape().to_vec(),
            right: nir_band.shape().to_vec(),
        });
    }
    Ok((red_band, nir_band))
}
