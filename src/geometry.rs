//! Vector geometry helpers.

use geo::{Coord, Geometry, LineString, MapCoords, Polygon};
use tracing::debug;

use crate::crs::{CoordTransformer, Crs};
use crate::error::Result;
use crate::raster::Bounds;

/// Reproject a geometry from `source` to `target`.
///
/// Every coordinate is transformed independently and the result keeps the
/// geometry type of the input; the input itself is left untouched.
pub fn reproject_geom(geometry: &Geometry<f64>, source: &Crs, target: &Crs) -> Result<Geometry<f64>> {
    let transformer = CoordTransformer::new(source, target)?;
    debug!(source = %source, target = %target, identity = transformer.is_identity(), "Reprojecting geometry");

    geometry.try_map_coords(|coord: Coord<f64>| -> Result<Coord<f64>> {
        let (x, y) = transformer.transform(coord.x, coord.y)?;
        Ok(Coord { x, y })
    })
}

/// Convert raster bounds to a closed polygon ring.
///
/// The ring runs (left, bottom) → (left, top) → (right, top) → (right, bottom)
/// and repeats the first point to close.
pub fn bounds_to_polygon(bounds: &Bounds) -> Polygon<f64> {
    let ring = LineString::from(vec![
        (bounds.left, bounds.bottom),
        (bounds.left, bounds.top),
        (bounds.right, bounds.top),
        (bounds.right, bounds.bottom),
        (bounds.left, bounds.bottom),
    ]);
    Polygon::new(ring, vec![])
}
