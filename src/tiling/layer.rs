//! Raster layers: a single georeferenced tile and its re-tiled form.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use super::layout::{GlobalLayout, TileKey};
use super::partition::HashPartitionStrategy;
use crate::context::ComputeContext;
use crate::crs::{CoordTransformer, Crs};
use crate::error::{MusaError, Result};
use crate::interpolation::ResampleMethod;
use crate::raster::{Bounds, ProjectedExtent};

/// Points sampled along each edge when projecting an extent
const EDGE_SAMPLES: usize = 32;

/// A single raster tile tagged with its extent and CRS.
///
/// No-data cells are stored as `NaN`.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    extent: ProjectedExtent,
    data: Array2<f64>,
}

impl RasterLayer {
    /// Wrap an array, replacing cells equal to `no_data` with `NaN`
    pub fn from_array(
        data: ArrayView2<f64>,
        no_data: Option<f64>,
        extent: ProjectedExtent,
    ) -> Result<Self> {
        extent.extent.validate()?;
        extent.crs.to_proj4()?;

        if data.is_empty() {
            return Err(MusaError::InvalidParameter {
                param: "data".to_string(),
                message: "Raster array is empty".to_string(),
            });
        }

        let data = match no_data {
            Some(sentinel) => data.mapv(|v| if v == sentinel { f64::NAN } else { v }),
            None => data.to_owned(),
        };

        Ok(Self { extent, data })
    }

    pub fn extent(&self) -> &ProjectedExtent {
        &self.extent
    }

    pub fn data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    /// Cell width and height in CRS units
    pub fn cell_size(&self) -> (f64, f64) {
        let (rows, cols) = self.data.dim();
        (
            self.extent.extent.width() / cols as f64,
            self.extent.extent.height() / rows as f64,
        )
    }

    /// Fractional `(row, col)` index of a point in the layer's CRS
    fn grid_index(&self, x: f64, y: f64) -> (f64, f64) {
        let (cell_w, cell_h) = self.cell_size();
        let bounds = &self.extent.extent;
        (
            (bounds.top - y) / cell_h - 0.5,
            (x - bounds.left) / cell_w - 0.5,
        )
    }

    /// Footprint of this layer's extent in `target`, from points along its edges
    fn projected_footprint(&self, target: &Crs) -> Result<Bounds> {
        let transformer = CoordTransformer::new(&self.extent.crs, target)?;
        let b = &self.extent.extent;

        let mut points = Vec::with_capacity(EDGE_SAMPLES * 4);
        for i in 0..=EDGE_SAMPLES {
            let t = i as f64 / EDGE_SAMPLES as f64;
            let x = b.left + t * b.width();
            let y = b.bottom + t * b.height();
            for (px, py) in [(x, b.bottom), (x, b.top), (b.left, y), (b.right, y)] {
                // Points outside the target's domain (e.g. the poles in web
                // mercator) are left out of the footprint.
                if let Ok(projected) = transformer.transform(px, py) {
                    points.push(projected);
                }
            }
        }

        Bounds::from_points(&points)
            .filter(|footprint| footprint.validate().is_ok())
            .ok_or_else(|| MusaError::Projection {
                message: format!("Extent {:?} has no valid footprint in {}", b, target),
            })
    }

    /// Re-tile this layer onto the global layout in `target` CRS.
    ///
    /// The zoom level is the coarsest one whose pixels are no larger than the
    /// source cells. Target tiles are grouped by `partitioning` and each
    /// partition is rendered on the context's worker pool; tiles that end up
    /// without any data are dropped.
    pub fn tile_to_layout(
        &self,
        context: &ComputeContext,
        layout: GlobalLayout,
        target: &Crs,
        partitioning: HashPartitionStrategy,
        method: ResampleMethod,
    ) -> Result<TiledRasterLayer> {
        let start = Instant::now();
        let footprint = self.projected_footprint(target)?;
        let (rows, cols) = self.data.dim();
        let resolution = (footprint.width() / cols as f64).min(footprint.height() / rows as f64);
        let zoom = layout.zoom_for_resolution(resolution);
        let keys = layout.keys_covering(zoom, &footprint);

        debug!(
            zoom = zoom,
            resolution = resolution,
            candidate_tiles = keys.len(),
            partitions = partitioning.num_partitions(),
            "Re-tiling raster layer"
        );

        let partitions = partitioning.partition(keys);
        let interpolator = method.interpolator();

        let rendered: Vec<Vec<(TileKey, Array2<f64>)>> = context.install(|| {
            partitions
                .par_iter()
                .filter(|partition| !partition.is_empty())
                .map(|partition| {
                    let inverse = CoordTransformer::new(target, &self.extent.crs)?;
                    let mut tiles = Vec::with_capacity(partition.len());
                    for key in partition {
                        let mut tile = Array2::from_elem((layout.tile_size, layout.tile_size), f64::NAN);
                        for ((row, col), cell) in tile.indexed_iter_mut() {
                            let (x, y) = layout.pixel_center(key, row, col);
                            if let Ok((sx, sy)) = inverse.transform(x, y) {
                                let (r, c) = self.grid_index(sx, sy);
                                *cell = interpolator.interpolate(self.data.view(), r, c);
                            }
                        }
                        if tile.iter().any(|v| v.is_finite()) {
                            tiles.push((*key, tile));
                        }
                    }
                    Ok(tiles)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let tiles: HashMap<TileKey, Array2<f64>> = rendered.into_iter().flatten().collect();

        info!(
            operation = "tile_to_layout",
            zoom = zoom,
            tiles = tiles.len(),
            target_crs = %target,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Raster layer tiled"
        );

        Ok(TiledRasterLayer {
            crs: target.clone(),
            layout,
            zoom,
            partitioning,
            tiles,
        })
    }
}

/// A raster split into layout tiles at one zoom level
#[derive(Debug, Clone)]
pub struct TiledRasterLayer {
    crs: Crs,
    layout: GlobalLayout,
    zoom: u8,
    partitioning: HashPartitionStrategy,
    tiles: HashMap<TileKey, Array2<f64>>,
}

impl TiledRasterLayer {
    pub fn new(
        crs: Crs,
        layout: GlobalLayout,
        zoom: u8,
        partitioning: HashPartitionStrategy,
        tiles: HashMap<TileKey, Array2<f64>>,
    ) -> Self {
        Self {
            crs,
            layout,
            zoom,
            partitioning,
            tiles,
        }
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn layout(&self) -> GlobalLayout {
        self.layout
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn partitioning(&self) -> HashPartitionStrategy {
        self.partitioning
    }

    pub fn tile(&self, key: &TileKey) -> Option<&Array2<f64>> {
        self.tiles.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.tiles.keys()
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&TileKey, &Array2<f64>)> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Smallest and largest finite cell values across all tiles
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.tiles
            .values()
            .flat_map(|tile| tile.iter().copied())
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
