//! Multi-resolution tile pyramids.
//!
//! Each level above the base is built by resampling 2×2 blocks of child
//! tiles into their parent, down to zoom 0.

use ndarray::{s, Array2};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;
use tracing::{debug, info};

use super::layer::TiledRasterLayer;
use super::layout::TileKey;
use crate::context::ComputeContext;
use crate::error::Result;
use crate::interpolation::ResampleMethod;

/// Tiled layers for every zoom from 0 to the base zoom
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: BTreeMap<u8, TiledRasterLayer>,
    method: ResampleMethod,
}

impl Pyramid {
    /// Build all levels above `base` with the given resampling method
    pub fn build(
        context: &ComputeContext,
        base: TiledRasterLayer,
        method: ResampleMethod,
    ) -> Result<Self> {
        let start = Instant::now();
        let base_zoom = base.zoom();
        let mut levels = BTreeMap::new();
        let mut current = base;

        while current.zoom() > 0 {
            let parent = downsample(context, &current, method);
            debug!(zoom = parent.zoom(), tiles = parent.len(), "Built pyramid level");
            levels.insert(current.zoom(), current);
            current = parent;
        }
        levels.insert(0, current);

        info!(
            operation = "pyramid",
            base_zoom = base_zoom,
            levels = levels.len(),
            resample_method = %method,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Pyramid built"
        );

        Ok(Self { levels, method })
    }

    pub fn level(&self, zoom: u8) -> Option<&TiledRasterLayer> {
        self.levels.get(&zoom)
    }

    pub fn levels(&self) -> impl Iterator<Item = (&u8, &TiledRasterLayer)> {
        self.levels.iter()
    }

    pub fn min_zoom(&self) -> u8 {
        self.levels.keys().next().copied().unwrap_or(0)
    }

    pub fn max_zoom(&self) -> u8 {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    /// The most detailed level
    pub fn base(&self) -> Option<&TiledRasterLayer> {
        self.levels.values().next_back()
    }

    pub fn resample_method(&self) -> ResampleMethod {
        self.method
    }

    pub fn tile_size(&self) -> usize {
        self.base().map(|b| b.layout().tile_size).unwrap_or(256)
    }
}

/// Build the parent level of `child` by halving its resolution
fn downsample(
    context: &ComputeContext,
    child: &TiledRasterLayer,
    method: ResampleMethod,
) -> TiledRasterLayer {
    let layout = child.layout();
    let size = layout.tile_size;
    let interpolator = method.interpolator();
    let parent_keys: BTreeSet<TileKey> = child.keys().filter_map(TileKey::parent).collect();
    let partitions = child.partitioning().partition(parent_keys);

    let rendered: Vec<(TileKey, Array2<f64>)> = context.install(|| {
        partitions
            .par_iter()
            .flat_map_iter(|partition| partition.iter())
            .filter_map(|parent| {
                let mut mosaic = Array2::from_elem((size * 2, size * 2), f64::NAN);
                for (i, child_key) in parent.children().iter().enumerate() {
                    if let Some(tile) = child.tile(child_key) {
                        let (r0, c0) = ((i / 2) * size, (i % 2) * size);
                        mosaic
                            .slice_mut(s![r0..r0 + size, c0..c0 + size])
                            .assign(tile);
                    }
                }

                let tile = Array2::from_shape_fn((size, size), |(r, c)| {
                    interpolator.interpolate(
                        mosaic.view(),
                        2.0 * r as f64 + 0.5,
                        2.0 * c as f64 + 0.5,
                    )
                });

                tile.iter()
                    .any(|v| v.is_finite())
                    .then_some((*parent, tile))
            })
            .collect()
    });

    let tiles: HashMap<TileKey, Array2<f64>> = rendered.into_iter().collect();
    TiledRasterLayer::new(
        child.crs().clone(),
        layout,
        child.zoom() - 1,
        child.partitioning(),
        tiles,
    )
}
