//! Tiling engine: global layouts, partitioning, re-tiling and pyramids.
//!
//! A [`RasterLayer`] is re-tiled onto a [`GlobalLayout`] as a
//! [`TiledRasterLayer`], expanded into a [`Pyramid`] and served as colored
//! PNG tiles by a [`TileService`].

pub mod layer;
pub mod layout;
pub mod partition;
pub mod pyramid;
pub mod service;

pub use layer::{RasterLayer, TiledRasterLayer};
pub use layout::{GlobalLayout, TileKey, MAX_ZOOM, WEB_MERCATOR_HALF_EXTENT};
pub use partition::HashPartitionStrategy;
pub use pyramid::Pyramid;
pub use service::TileService;
