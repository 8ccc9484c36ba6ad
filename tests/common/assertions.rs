//! Assertion utilities for testing.
//!
//! Float comparisons for NDVI grids and projected coordinates. NaN marks
//! no-data in every raster the helpers produce, so it compares equal to
//! itself here.

use ndarray::ArrayView2;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

fn close(a: f64, e: f64, epsilon: f64) -> bool {
    (a.is_nan() && e.is_nan()) || (a - e).abs() <= epsilon
}

/// Assert that two values are within `epsilon` (default 1e-9) of each other.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    assert!(
        close(actual, expected, epsilon),
        "Values not approximately equal: actual = {}, expected = {}, epsilon = {}",
        actual,
        expected,
        epsilon
    );
}

/// Assert that two grids have the same shape and agree cell by cell.
///
/// # Panics
///
/// Panics on a shape difference, on a cell that is NaN on one side only, or
/// on a finite pair further apart than `epsilon`. The message names the
/// first offending `(row, col)`.
pub fn assert_grid_approx_eq(
    actual: ArrayView2<f64>,
    expected: ArrayView2<f64>,
    epsilon: Option<f64>,
) {
    assert_eq!(actual.dim(), expected.dim(), "Grids have different shapes");
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);

    for ((idx, a), e) in actual.indexed_iter().zip(expected.iter()) {
        assert!(
            close(*a, *e, epsilon),
            "Grids differ at {:?}: actual = {}, expected = {}",
            idx,
            a,
            e
        );
    }
}

/// Assert that every finite cell lies in `[min, max]`.
pub fn assert_finite_in_range(grid: ArrayView2<f64>, min: f64, max: f64) {
    for (idx, v) in grid.indexed_iter() {
        if v.is_finite() {
            assert!(
                *v >= min && *v <= max,
                "Cell {:?} = {} outside [{}, {}]",
                idx,
                v,
                min,
                max
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0 + 1e-12, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
        assert_approx_eq(f64::NAN, f64::NAN, None);
    }

    #[test]
    fn test_assert_grid_approx_eq() {
        let a = array![[f64::NAN, 0.5], [0.25, -0.1]];
        let b = array![[f64::NAN, 0.5 + 1e-12], [0.25, -0.1]];
        assert_grid_approx_eq(a.view(), b.view(), None);
    }

    #[test]
    #[should_panic(expected = "Grids differ at (0, 0)")]
    fn test_assert_grid_approx_eq_one_sided_nan() {
        let a = array![[f64::NAN]];
        let b = array![[0.0]];
        assert_grid_approx_eq(a.view(), b.view(), None);
    }

    #[test]
    fn test_assert_finite_in_range() {
        let grid = array![[f64::NAN, 0.2], [0.8, 0.5]];
        assert_finite_in_range(grid.view(), 0.0, 1.0);
    }
}
