//! Break-map colormaps.
//!
//! A break map classifies raw values against an ordered list of breaks: a
//! value gets the color of the first break it does not exceed. Values above
//! the last break take the last color, and no-data values are transparent.

use super::colormap::{unpack_rgba, Colormap, TRANSPARENT};
use crate::error::{MusaError, Result};

/// Colormap built from `(break, 0xRRGGBBAA)` pairs
#[derive(Debug, Clone, PartialEq)]
pub struct BreakMap {
    name: String,
    breaks: Vec<f64>,
    colors: Vec<[u8; 4]>,
}

impl BreakMap {
    /// Build a break map; breaks must be finite and strictly increasing
    pub fn from_breaks(name: &str, breaks: &[(f64, u32)]) -> Result<Self> {
        if breaks.is_empty() {
            return Err(MusaError::InvalidColorMap {
                message: "Break map needs at least one break".to_string(),
            });
        }

        if let Some((value, _)) = breaks.iter().find(|(value, _)| !value.is_finite()) {
            return Err(MusaError::InvalidColorMap {
                message: format!("Break value {} is not finite", value),
            });
        }

        if let Some(pair) = breaks.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(MusaError::InvalidColorMap {
                message: format!(
                    "Break values must be strictly increasing: {} is followed by {}",
                    pair[0].0, pair[1].0
                ),
            });
        }

        Ok(Self::from_sorted_breaks(name, breaks))
    }

    /// Build a break map from breaks already known to be valid
    pub(crate) fn from_sorted_breaks(name: &str, breaks: &[(f64, u32)]) -> Self {
        debug_assert!(!breaks.is_empty());
        Self {
            name: name.to_string(),
            breaks: breaks.iter().map(|(value, _)| *value).collect(),
            colors: breaks.iter().map(|(_, color)| unpack_rgba(*color)).collect(),
        }
    }

    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    /// Classify a raw value
    pub fn color_for(&self, value: f64) -> [u8; 4] {
        if value.is_nan() {
            return TRANSPARENT;
        }
        let index = self.breaks.partition_point(|&b| b < value);
        self.colors[index.min(self.colors.len() - 1)]
    }
}

impl Colormap for BreakMap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        self.color_for(value)
    }

    /// Break maps classify raw values, so the data range is ignored
    fn map(&self, value: f64, _min: f64, _max: f64) -> [u8; 4] {
        self.color_for(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BreakMap {
        BreakMap::from_breaks("sample", &[(0.0, 0xff0000ff), (1.0, 0x00ff00ff), (2.0, 0x0000ffff)])
            .unwrap()
    }

    #[test]
    fn test_first_break_not_exceeded() {
        let map = sample();
        assert_eq!(map.color_for(-5.0), [255, 0, 0, 255]);
        assert_eq!(map.color_for(0.0), [255, 0, 0, 255]);
        assert_eq!(map.color_for(0.5), [0, 255, 0, 255]);
        assert_eq!(map.color_for(1.0), [0, 255, 0, 255]);
        assert_eq!(map.color_for(1.5), [0, 0, 255, 255]);
    }

    #[test]
    fn test_above_last_break_and_nan() {
        let map = sample();
        assert_eq!(map.color_for(100.0), [0, 0, 255, 255]);
        assert_eq!(map.color_for(f64::NAN), TRANSPARENT);
        assert_eq!(map.map(1.5, 0.0, 0.0), map.color_for(1.5));
    }

    #[test]
    fn test_rejects_bad_breaks() {
        assert!(BreakMap::from_breaks("empty", &[]).is_err());
        assert!(BreakMap::from_breaks("dup", &[(0.1, 0), (0.1, 1)]).is_err());
        assert!(BreakMap::from_breaks("desc", &[(0.5, 0), (0.1, 1)]).is_err());
        assert!(BreakMap::from_breaks("nan", &[(f64::NAN, 0)]).is_err());
    }
}
