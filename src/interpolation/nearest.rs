//! Nearest neighbor interpolation.
//!
//! This method selects the value of the nearest grid point.
//! It's the simplest interpolation method, offering the fastest
//! performance but with less smooth results compared to higher-order methods.

use ndarray::ArrayView2;

use super::common::{clamp_index, in_domain};
use super::Interpolator;

/// Nearest neighbor interpolator
pub struct NearestInterpolator;

impl Interpolator for NearestInterpolator {
    fn interpolate(&self, data: ArrayView2<f64>, row: f64, col: f64) -> f64 {
        let (rows, cols) = data.dim();
        if !in_domain(row, rows) || !in_domain(col, cols) {
            return f64::NAN;
        }

        let r = clamp_index(row.round(), rows) as usize;
        let c = clamp_index(col.round(), cols) as usize;
        data[[r, c]]
    }

    fn name(&self) -> &str {
        "nearest"
    }
}
