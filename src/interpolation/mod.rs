//! Interpolation algorithms for raster resampling.
//!
//! Interpolators sample a 2D grid at fractional `(row, col)` indices and
//! return `NaN` when the point lies outside the grid or only touches
//! no-data cells.

pub mod bicubic;
pub mod bilinear;
pub mod common;
pub mod nearest;

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MusaError, Result};

/// Trait for interpolation methods
pub trait Interpolator: Send + Sync {
    /// Interpolate a value at the given fractional indices
    fn interpolate(&self, data: ArrayView2<f64>, row: f64, col: f64) -> f64;

    /// Get the name of this interpolation method
    fn name(&self) -> &str;
}

/// Resampling method used when re-tiling and building pyramids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleMethod {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
}

impl ResampleMethod {
    /// The interpolator implementing this method
    pub fn interpolator(&self) -> &'static dyn Interpolator {
        match self {
            ResampleMethod::Nearest => &nearest::NearestInterpolator,
            ResampleMethod::Bilinear => &bilinear::BilinearInterpolator,
            ResampleMethod::Bicubic => &bicubic::BicubicInterpolator,
        }
    }
}

impl FromStr for ResampleMethod {
    type Err = MusaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(ResampleMethod::Nearest),
            "bilinear" => Ok(ResampleMethod::Bilinear),
            "bicubic" => Ok(ResampleMethod::Bicubic),
            _ => Err(MusaError::InvalidParameter {
                param: "resample_method".to_string(),
                message: format!("Unknown resample method: {}", s),
            }),
        }
    }
}

impl fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interpolator().name())
    }
}

/// Get an interpolator by name
pub fn get_interpolator(name: &str) -> Result<&'static dyn Interpolator> {
    Ok(name.parse::<ResampleMethod>()?.interpolator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_method_names() {
        for name in ["nearest", "bilinear", "bicubic"] {
            let method: ResampleMethod = name.parse().unwrap();
            assert_eq!(method.to_string(), name);
            assert_eq!(get_interpolator(name).unwrap().name(), name);
        }
        assert_eq!("BILINEAR".parse::<ResampleMethod>().unwrap(), ResampleMethod::Bilinear);
        assert!(get_interpolator("lanczos").is_err());
    }
}
