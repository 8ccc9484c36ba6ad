//! Bilinear interpolation.
//!
//! This method performs linear interpolation in two dimensions using
//! the four nearest grid points. No-data neighbors are left out and the
//! remaining weights renormalized.

use ndarray::ArrayView2;

use super::common::{clamp_index, in_domain, linear_weight};
use super::Interpolator;

/// Bilinear interpolator
pub struct BilinearInterpolator;

impl Interpolator for BilinearInterpolator {
    fn interpolate(&self, data: ArrayView2<f64>, row: f64, col: f64) -> f64 {
        let (rows, cols) = data.dim();
        if !in_domain(row, rows) || !in_domain(col, cols) {
            return f64::NAN;
        }

        let r = clamp_index(row, rows);
        let c = clamp_index(col, cols);
        let r0 = r.floor() as usize;
        let c0 = c.floor() as usize;
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = (c0 + 1).min(cols - 1);
        let (wr0, wr1) = linear_weight(r - r0 as f64);
        let (wc0, wc1) = linear_weight(c - c0 as f64);

        let mut sum = 0.0;
        let mut total_weight = 0.0;
        for (rr, wr) in [(r0, wr0), (r1, wr1)] {
            for (cc, wc) in [(c0, wc0), (c1, wc1)] {
                let value = data[[rr, cc]];
                let weight = wr * wc;
                if value.is_finite() && weight > 0.0 {
                    sum += value * weight;
                    total_weight += weight;
                }
            }
        }

        if total_weight > 0.0 {
            sum / total_weight
        } else {
            f64::NAN
        }
    }

    fn name(&self) -> &str {
        "bilinear"
    }
}
