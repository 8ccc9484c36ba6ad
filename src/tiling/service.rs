//! Rendering pyramid tiles as colored images.

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use ndarray::Array2;
use std::io::Cursor;
use tracing::debug;

use super::layout::{GlobalLayout, TileKey, MAX_ZOOM};
use super::pyramid::Pyramid;
use crate::colormaps::Colormap;
use crate::error::{MusaError, Result};

/// A pyramid paired with the colormap it is displayed with
pub struct TileService {
    pyramid: Pyramid,
    colormap: Box<dyn Colormap>,
    value_range: (f64, f64),
}

impl std::fmt::Debug for TileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileService")
            .field("colormap", &self.colormap.name())
            .field("min_zoom", &self.pyramid.min_zoom())
            .field("max_zoom", &self.pyramid.max_zoom())
            .field("value_range", &self.value_range)
            .finish()
    }
}

impl TileService {
    pub fn build(pyramid: Pyramid, colormap: Box<dyn Colormap>) -> Self {
        let value_range = pyramid
            .base()
            .and_then(|base| base.value_range())
            .unwrap_or((0.0, 1.0));

        Self {
            pyramid,
            colormap,
            value_range,
        }
    }

    pub fn pyramid(&self) -> &Pyramid {
        &self.pyramid
    }

    pub fn colormap_name(&self) -> &str {
        self.colormap.name()
    }

    /// Smallest and largest finite values of the base level
    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    pub fn tile_size(&self) -> usize {
        self.pyramid.tile_size()
    }

    /// Raw values of tile `(z, x, y)`.
    ///
    /// Zooms past the deepest level are upsampled from their ancestor there.
    /// Returns `None` when the tile holds no data.
    pub fn tile_values(&self, z: u8, x: u32, y: u32) -> Result<Option<Array2<f64>>> {
        if z > MAX_ZOOM {
            return Err(MusaError::InvalidParameter {
                param: "z".to_string(),
                message: format!("Zoom {} exceeds the maximum of {}", z, MAX_ZOOM),
            });
        }
        let across = GlobalLayout::tiles_across(z);
        if x >= across || y >= across {
            return Err(MusaError::InvalidParameter {
                param: "x/y".to_string(),
                message: format!(
                    "Tile ({}, {}) is outside the {}x{} grid at zoom {}",
                    x, y, across, across, z
                ),
            });
        }

        let key = TileKey::new(z, x, y);
        let max_zoom = self.pyramid.max_zoom();
        if z <= max_zoom {
            return Ok(self
                .pyramid
                .level(z)
                .and_then(|level| level.tile(&key))
                .cloned());
        }

        let Some(ancestor) = key.ancestor(max_zoom) else {
            return Ok(None);
        };
        let Some(source) = self
            .pyramid
            .level(max_zoom)
            .and_then(|level| level.tile(&ancestor))
        else {
            return Ok(None);
        };

        let shift = z - max_zoom;
        let scale = (1u32 << shift) as f64;
        let size = source.nrows();
        let sub_col = (x - (ancestor.col << shift)) as f64;
        let sub_row = (y - (ancestor.row << shift)) as f64;
        let interpolator = self.pyramid.resample_method().interpolator();

        debug!(z = z, x = x, y = y, source_zoom = max_zoom, "Over-zooming tile");

        let tile = Array2::from_shape_fn((size, size), |(r, c)| {
            let row = (sub_row * size as f64 + r as f64 + 0.5) / scale - 0.5;
            let col = (sub_col * size as f64 + c as f64 + 0.5) / scale - 0.5;
            interpolator.interpolate(source.view(), row, col)
        });

        Ok(tile.iter().any(|v| v.is_finite()).then_some(tile))
    }

    /// Colored tile `(z, x, y)`, or `None` outside the layer
    pub fn render_tile(&self, z: u8, x: u32, y: u32) -> Result<Option<RgbaImage>> {
        let Some(values) = self.tile_values(z, x, y)? else {
            return Ok(None);
        };

        let (rows, cols) = values.dim();
        let (min, max) = self.value_range;
        let img = ImageBuffer::from_fn(cols as u32, rows as u32, |px, py| {
            Rgba(self.colormap.map(values[[py as usize, px as usize]], min, max))
        });
        Ok(Some(img))
    }

    /// PNG-encoded tile `(z, x, y)`, or `None` outside the layer
    pub fn render_png(&self, z: u8, x: u32, y: u32) -> Result<Option<Vec<u8>>> {
        let Some(img) = self.render_tile(z, x, y)? else {
            return Ok(None);
        };

        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(Some(buffer.into_inner()))
    }
}
