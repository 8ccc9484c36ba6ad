//! Raster bounds and projected extents.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::crs::Crs;
use crate::error::{MusaError, Result};

/// An axis-aligned rectangle in some coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Check that all edges are finite and the rectangle is non-degenerate
    pub fn validate(&self) -> Result<()> {
        if ![self.left, self.bottom, self.right, self.top]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(MusaError::InvalidBounds {
                message: format!("Bounds must be finite: {:?}", self),
            });
        }

        if self.left >= self.right {
            return Err(MusaError::InvalidBounds {
                message: format!("left ({}) must be < right ({})", self.left, self.right),
            });
        }

        if self.bottom >= self.top {
            return Err(MusaError::InvalidBounds {
                message: format!("bottom ({}) must be < top ({})", self.bottom, self.top),
            });
        }

        Ok(())
    }

    /// The overlapping part of two rectangles, if they overlap with non-zero area
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let left = self.left.max(other.left);
        let bottom = self.bottom.max(other.bottom);
        let right = self.right.min(other.right);
        let top = self.top.min(other.top);

        if left < right && bottom < top {
            Some(Bounds::new(left, bottom, right, top))
        } else {
            None
        }
    }

    /// Smallest rectangle containing all the given points
    pub fn from_points(points: &[(f64, f64)]) -> Option<Bounds> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            bounds.left = bounds.left.min(x);
            bounds.bottom = bounds.bottom.min(y);
            bounds.right = bounds.right.max(x);
            bounds.top = bounds.top.max(y);
        }
        Some(bounds)
    }
}

/// Parse a bounds string "left,bottom,right,top"
impl FromStr for Bounds {
    type Err = MusaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(MusaError::InvalidParameter {
                param: "bounds".to_string(),
                message: "Bounds must be in format 'left,bottom,right,top'".to_string(),
            });
        }

        let mut values = [0.0; 4];
        for (value, (part, name)) in values
            .iter_mut()
            .zip(parts.iter().zip(["left", "bottom", "right", "top"]))
        {
            *value = part.parse::<f64>().map_err(|_| MusaError::InvalidParameter {
                param: "bounds".to_string(),
                message: format!("Invalid {}: {}", name, part),
            })?;
        }

        let bounds = Bounds::new(values[0], values[1], values[2], values[3]);
        bounds.validate()?;
        Ok(bounds)
    }
}

/// Bounds tagged with the coordinate system they are expressed in
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedExtent {
    pub extent: Bounds,
    pub crs: Crs,
}

impl ProjectedExtent {
    pub fn new(extent: Bounds, crs: Crs) -> Self {
        Self { extent, crs }
    }
}
