//! Sequential colormaps (single-hue progression).
//!
//! These colormaps are suitable for data that progresses from low to high.

use super::colormap::Colormap;

/// Number of entries sampled from a gradient
const LUT_SIZE: usize = 256;

/// Linear grayscale, black to white
pub struct Gray;

impl Colormap for Gray {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let v = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [v, v, v, 255]
    }

    fn name(&self) -> &str {
        "gray"
    }
}

/// A colormap sampled from a `colorgrad` gradient into a lookup table
pub struct GradientColormap {
    name: String,
    lut: Vec<[u8; 4]>,
}

impl GradientColormap {
    pub fn new(name: &str, gradient: &colorgrad::Gradient) -> Self {
        let (dmin, dmax) = gradient.domain();
        let lut = (0..LUT_SIZE)
            .map(|i| {
                let t = i as f64 / (LUT_SIZE - 1) as f64;
                gradient.at(dmin + t * (dmax - dmin)).to_rgba8()
            })
            .collect();

        Self {
            name: name.to_string(),
            lut,
        }
    }
}

impl Colormap for GradientColormap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let index = (value.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f64).round() as usize;
        self.lut[index]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colormap_names() {
        assert_eq!(Gray.name(), "gray");
        assert_eq!(GradientColormap::new("viridis", &colorgrad::viridis()).name(), "viridis");
    }

    #[test]
    fn test_gradient_endpoints() {
        let viridis = GradientColormap::new("viridis", &colorgrad::viridis());
        let low = viridis.map_normalized(0.0);
        let high = viridis.map_normalized(1.0);

        // Viridis runs from dark purple to bright yellow
        assert!(low[2] > low[1]);
        assert!(high[0] > high[2] && high[1] > high[2]);
        assert_eq!(low[3], 255);
        assert_eq!(viridis.map_normalized(-1.0), low);
        assert_eq!(viridis.map_normalized(2.0), high);
    }

    #[test]
    fn test_gray_is_monotonic() {
        let mut previous = 0u8;
        for i in 0..=10 {
            let [v, _, _, a] = Gray.map_normalized(i as f64 / 10.0);
            assert!(v >= previous);
            assert_eq!(a, 255);
            previous = v;
        }
    }
}
