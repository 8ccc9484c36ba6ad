//! Bicubic interpolation.
//!
//! This method uses 16 surrounding grid points to produce smoother
//! interpolation results than bilinear. Neighborhoods that touch no-data
//! fall back to bilinear sampling.

use ndarray::ArrayView2;

use super::bilinear::BilinearInterpolator;
use super::common::{clamp_cell, clamp_index, cubic_weight, in_domain};
use super::Interpolator;

/// Bicubic interpolator
pub struct BicubicInterpolator;

impl Interpolator for BicubicInterpolator {
    fn interpolate(&self, data: ArrayView2<f64>, row: f64, col: f64) -> f64 {
        let (rows, cols) = data.dim();
        if !in_domain(row, rows) || !in_domain(col, cols) {
            return f64::NAN;
        }

        let r = clamp_index(row, rows);
        let c = clamp_index(col, cols);
        let r_base = r.floor() as i64;
        let c_base = c.floor() as i64;
        let fr = r - r_base as f64;
        let fc = c - c_base as f64;

        let mut sum = 0.0;
        for i in -1..=2 {
            let rr = clamp_cell(r_base + i, rows);
            let wr = cubic_weight(fr - i as f64);
            for j in -1..=2 {
                let cc = clamp_cell(c_base + j, cols);
                let value = data[[rr, cc]];
                if !value.is_finite() {
                    return BilinearInterpolator.interpolate(data, row, col);
                }
                sum += value * wr * cubic_weight(fc - j as f64);
            }
        }
        sum
    }

    fn name(&self) -> &str {
        "bicubic"
    }
}
