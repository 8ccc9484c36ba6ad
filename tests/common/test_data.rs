//! Test data generation utilities.
//!
//! This module writes synthetic red and near-infrared bands with known NDVI
//! patterns as 16-bit grayscale PNGs.

use image::{ImageBuffer, ImageResult, Luma};
use ndarray::Array2;
use std::path::{Path, PathBuf};

pub type Band = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Bounds of the synthetic scene in EPSG:4326, left/bottom/right/top
pub const SCENE_BOUNDS: (f64, f64, f64, f64) = (-93.5, 41.5, -93.0, 42.0);

/// Red reflectance used everywhere outside the no-data stripe
pub const RED_VALUE: u16 = 1000;

/// Near-infrared reflectance that rises left to right.
///
/// Column `c` of a `width`-wide scene gives NDVI `(nir - 1000) / (nir + 1000)`
/// running from 0.2 at the left edge toward 0.8 at the right.
pub fn nir_value(col: u32, width: u32) -> u16 {
    let ndvi = 0.2 + 0.6 * col as f64 / width as f64;
    (RED_VALUE as f64 * (1.0 + ndvi) / (1.0 - ndvi)).round() as u16
}

/// A red band with a no-data (zero) first row
pub fn red_band(width: u32, height: u32) -> Band {
    ImageBuffer::from_fn(width, height, |_, y| {
        if y == 0 {
            Luma([0])
        } else {
            Luma([RED_VALUE])
        }
    })
}

/// A near-infrared band with the gradient of [`nir_value`]
pub fn nir_band(width: u32, height: u32) -> Band {
    ImageBuffer::from_fn(width, height, |x, _| Luma([nir_value(x, width)]))
}

/// Write both bands into `dir`, returning `(red, nir)` paths
pub fn write_bands(dir: &Path, width: u32, height: u32) -> ImageResult<(PathBuf, PathBuf)> {
    let red = dir.join("red.png");
    let nir = dir.join("nir.png");
    red_band(width, height).save(&red)?;
    nir_band(width, height).save(&nir)?;
    Ok((red, nir))
}

/// The NDVI the bands above should produce, NaN in the no-data row
pub fn expected_ndvi(width: u32, height: u32) -> Array2<f64> {
    Array2::from_shape_fn((height as usize, width as usize), |(r, c)| {
        if r == 0 {
            f64::NAN
        } else {
            let red = RED_VALUE as f64;
            let nir = nir_value(c as u32, width) as f64;
            (nir - red) / (nir + red)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nir_gradient() {
        assert_eq!(nir_value(0, 10), 1500);
        assert!(nir_value(9, 10) > nir_value(1, 10));

        let expected = expected_ndvi(10, 3);
        assert!(expected[[0, 4]].is_nan());
        assert!((expected[[1, 0]] - 0.2).abs() < 1e-3);
    }
}
