//! Common utilities for interpolation algorithms.
//!
//! Grid indices are fractional with pixel centers at whole numbers, so a
//! grid of `size` cells covers indices `-0.5..size - 0.5`.

/// Whether a fractional index falls inside a grid dimension
pub fn in_domain(index: f64, size: usize) -> bool {
    size > 0 && index >= -0.5 && index <= size as f64 - 0.5
}

/// Clamp an index to valid bounds
pub fn clamp_index(index: f64, size: usize) -> f64 {
    index.max(0.0).min((size - 1) as f64)
}

/// Clamp a signed cell index to valid bounds
pub fn clamp_cell(index: i64, size: usize) -> usize {
    index.clamp(0, size as i64 - 1) as usize
}

/// Get the weight for linear interpolation
pub fn linear_weight(fraction: f64) -> (f64, f64) {
    (1.0 - fraction, fraction)
}

/// Catmull-Rom cubic convolution weight (a = -0.5)
pub fn cubic_weight(x: f64) -> f64 {
    const A: f64 = -0.5;
    let x = x.abs();
    if x < 1.0 {
        (A + 2.0) * x * x * x - (A + 3.0) * x * x + 1.0
    } else if x < 2.0 {
        A * x * x * x - 5.0 * A * x * x + 8.0 * A * x - 4.0 * A
    } else {
        0.0
    }
}
