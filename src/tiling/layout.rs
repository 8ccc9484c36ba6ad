//! The global web-mercator tile layout.
//!
//! Zoom level `z` splits the EPSG:3857 square into `2^z × 2^z` tiles of
//! `tile_size` pixels. Keys follow the XYZ convention: `col` grows east and
//! `row` grows south from the north edge of the world.

use serde::{Deserialize, Serialize};

use crate::raster::Bounds;

/// Half the earth's circumference in web-mercator meters
pub const WEB_MERCATOR_HALF_EXTENT: f64 = 20_037_508.342_789_244;

/// Deepest zoom level the layout will select
pub const MAX_ZOOM: u8 = 22;

/// Address of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub zoom: u8,
    pub col: u32,
    pub row: u32,
}

impl TileKey {
    pub fn new(zoom: u8, col: u32, row: u32) -> Self {
        Self { zoom, col, row }
    }

    /// The tile one level up that contains this one
    pub fn parent(&self) -> Option<TileKey> {
        (self.zoom > 0).then(|| TileKey::new(self.zoom - 1, self.col / 2, self.row / 2))
    }

    /// The four tiles one level down, in row-major order
    pub fn children(&self) -> [TileKey; 4] {
        let (z, c, r) = (self.zoom + 1, self.col * 2, self.row * 2);
        [
            TileKey::new(z, c, r),
            TileKey::new(z, c + 1, r),
            TileKey::new(z, c, r + 1),
            TileKey::new(z, c + 1, r + 1),
        ]
    }

    /// The ancestor of this tile at a lower zoom level
    pub fn ancestor(&self, zoom: u8) -> Option<TileKey> {
        let shift = self.zoom.checked_sub(zoom)?;
        Some(TileKey::new(zoom, self.col >> shift, self.row >> shift))
    }
}

/// Power-of-two tile pyramid over the web-mercator square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLayout {
    pub tile_size: usize,
}

impl Default for GlobalLayout {
    fn default() -> Self {
        Self { tile_size: 256 }
    }
}

impl GlobalLayout {
    pub fn new(tile_size: usize) -> Self {
        Self { tile_size }
    }

    /// The full extent covered by the layout
    pub fn world_bounds() -> Bounds {
        Bounds::new(
            -WEB_MERCATOR_HALF_EXTENT,
            -WEB_MERCATOR_HALF_EXTENT,
            WEB_MERCATOR_HALF_EXTENT,
            WEB_MERCATOR_HALF_EXTENT,
        )
    }

    pub fn tiles_across(zoom: u8) -> u32 {
        1u32 << zoom
    }

    /// Width of one tile in meters
    pub fn tile_span(zoom: u8) -> f64 {
        2.0 * WEB_MERCATOR_HALF_EXTENT / Self::tiles_across(zoom) as f64
    }

    /// Width of one pixel in meters
    pub fn resolution(&self, zoom: u8) -> f64 {
        Self::tile_span(zoom) / self.tile_size as f64
    }

    /// The coarsest zoom whose pixels are at least as fine as `resolution`
    pub fn zoom_for_resolution(&self, resolution: f64) -> u8 {
        (0..=MAX_ZOOM)
            .find(|&z| self.resolution(z) <= resolution)
            .unwrap_or(MAX_ZOOM)
    }

    pub fn tile_bounds(&self, key: &TileKey) -> Bounds {
        let span = Self::tile_span(key.zoom);
        let left = -WEB_MERCATOR_HALF_EXTENT + key.col as f64 * span;
        let top = WEB_MERCATOR_HALF_EXTENT - key.row as f64 * span;
        Bounds::new(left, top - span, left + span, top)
    }

    /// Map coordinates of the center of pixel `(row, col)` within a tile
    pub fn pixel_center(&self, key: &TileKey, row: usize, col: usize) -> (f64, f64) {
        let bounds = self.tile_bounds(key);
        let resolution = self.resolution(key.zoom);
        (
            bounds.left + (col as f64 + 0.5) * resolution,
            bounds.top - (row as f64 + 0.5) * resolution,
        )
    }

    /// All keys at `zoom` whose tiles intersect `bounds`
    pub fn keys_covering(&self, zoom: u8, bounds: &Bounds) -> Vec<TileKey> {
        let Some(clipped) = bounds.intersection(&Self::world_bounds()) else {
            return Vec::new();
        };

        let span = Self::tile_span(zoom);
        let last = Self::tiles_across(zoom) - 1;
        let to_index = |offset: f64| ((offset / span).floor().max(0.0) as u32).min(last);

        let min_col = to_index(clipped.left + WEB_MERCATOR_HALF_EXTENT);
        let max_col = to_index(clipped.right + WEB_MERCATOR_HALF_EXTENT - span * 1e-9);
        let min_row = to_index(WEB_MERCATOR_HALF_EXTENT - clipped.top);
        let max_row = to_index(WEB_MERCATOR_HALF_EXTENT - clipped.bottom - span * 1e-9);

        (min_row..=max_row)
            .flat_map(|row| (min_col..=max_col).map(move |col| TileKey::new(zoom, col, row)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_covers_world() {
        let layout = GlobalLayout::default();
        let bounds = layout.tile_bounds(&TileKey::new(0, 0, 0));
        assert_eq!(bounds, GlobalLayout::world_bounds());
        assert!((layout.resolution(0) - 156_543.033_928_041).abs() < 1e-6);
    }

    #[test]
    fn test_tile_bounds_xyz_convention() {
        let layout = GlobalLayout::default();
        // Row 0 is the northern half, col 1 the eastern half
        let ne = layout.tile_bounds(&TileKey::new(1, 1, 0));
        assert_eq!(ne.left, 0.0);
        assert_eq!(ne.bottom, 0.0);
        assert_eq!(ne.right, WEB_MERCATOR_HALF_EXTENT);
        assert_eq!(ne.top, WEB_MERCATOR_HALF_EXTENT);
    }

    #[test]
    fn test_zoom_for_resolution() {
        let layout = GlobalLayout::default();
        assert_eq!(layout.zoom_for_resolution(1e9), 0);

        let z = layout.zoom_for_resolution(30.0);
        assert!(layout.resolution(z) <= 30.0);
        assert!(layout.resolution(z - 1) > 30.0);
        assert_eq!(layout.zoom_for_resolution(1e-6), MAX_ZOOM);
    }

    #[test]
    fn test_keys_covering() {
        let layout = GlobalLayout::default();

        // A small box just north-east of the origin
        let keys = layout.keys_covering(2, &Bounds::new(1.0, 1.0, 10.0, 10.0));
        assert_eq!(keys, vec![TileKey::new(2, 2, 1)]);

        // A box straddling the origin touches four tiles
        let keys = layout.keys_covering(1, &Bounds::new(-10.0, -10.0, 10.0, 10.0));
        assert_eq!(keys.len(), 4);

        // Everything beyond the world is clipped
        let keys = layout.keys_covering(0, &Bounds::new(-1e9, -1e9, 1e9, 1e9));
        assert_eq!(keys, vec![TileKey::new(0, 0, 0)]);
    }

    #[test]
    fn test_parent_children() {
        let key = TileKey::new(3, 5, 2);
        for child in key.children() {
            assert_eq!(child.parent(), Some(key));
        }
        assert_eq!(TileKey::new(0, 0, 0).parent(), None);
        assert_eq!(TileKey::new(5, 21, 9).ancestor(3), Some(TileKey::new(3, 5, 2)));
        assert_eq!(key.ancestor(4), None);
    }

    #[test]
    fn test_pixel_center() {
        let layout = GlobalLayout::new(2);
        let (x, y) = layout.pixel_center(&TileKey::new(0, 0, 0), 0, 0);
        assert!((x + WEB_MERCATOR_HALF_EXTENT / 2.0).abs() < 1e-6);
        assert!((y - WEB_MERCATOR_HALF_EXTENT / 2.0).abs() < 1e-6);
    }
}
