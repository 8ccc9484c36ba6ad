//! The interactive map: named tile layers served to the browser.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::tiling::TileService;

/// Summary of one map layer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub colormap: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub tile_size: usize,
    pub value_range: (f64, f64),
}

/// An ordered set of named tile layers.
///
/// Layers are drawn in insertion order; adding a layer under an existing
/// name replaces it in place.
#[derive(Debug, Default)]
pub struct InteractiveMap {
    layers: RwLock<Vec<(String, Arc<TileService>)>>,
}

impl InteractiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&self, service: TileService, name: &str) {
        let service = Arc::new(service);
        let mut layers = self.layers.write();
        match layers.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => {
                entry.1 = service;
                info!(layer = %name, "Replaced map layer");
            }
            None => {
                layers.push((name.to_string(), service));
                info!(layer = %name, layers = layers.len(), "Added map layer");
            }
        }
    }

    /// Remove a layer, returning whether it existed
    pub fn remove_layer(&self, name: &str) -> bool {
        let mut layers = self.layers.write();
        let before = layers.len();
        layers.retain(|(existing, _)| existing != name);
        before != layers.len()
    }

    pub fn layer(&self, name: &str) -> Option<Arc<TileService>> {
        self.layers
            .read()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, service)| Arc::clone(service))
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.layers.read().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.read().is_empty()
    }

    pub fn layers_info(&self) -> Vec<LayerInfo> {
        self.layers
            .read()
            .iter()
            .map(|(name, service)| LayerInfo {
                name: name.clone(),
                colormap: service.colormap_name().to_string(),
                min_zoom: service.pyramid().min_zoom(),
                max_zoom: service.pyramid().max_zoom(),
                tile_size: service.tile_size(),
                value_range: service.value_range(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormaps::get_colormap;
    use crate::config::ComputeConfig;
    use crate::context::ComputeContext;
    use crate::crs::Crs;
    use crate::interpolation::ResampleMethod;
    use crate::tiling::{GlobalLayout, HashPartitionStrategy, Pyramid, TileKey, TiledRasterLayer};
    use ndarray::Array2;
    use std::collections::HashMap;

    fn service(value: f64, colormap: &str) -> TileService {
        let context = ComputeContext::new(&ComputeConfig {
            master: "local".to_string(),
            ..Default::default()
        })
        .unwrap();
        let mut tiles = HashMap::new();
        tiles.insert(TileKey::new(0, 0, 0), Array2::from_elem((4, 4), value));
        let base = TiledRasterLayer::new(
            Crs::web_mercator(),
            GlobalLayout::new(4),
            0,
            HashPartitionStrategy::new(1).unwrap(),
            tiles,
        );
        let pyramid = Pyramid::build(&context, base, ResampleMethod::Bilinear).unwrap();
        TileService::build(pyramid, get_colormap(colormap).unwrap())
    }

    #[test]
    fn test_add_and_replace_layers() {
        let map = InteractiveMap::new();
        assert!(map.is_empty());

        map.add_layer(service(1.0, "gray"), "first");
        map.add_layer(service(2.0, "gray"), "second");
        assert_eq!(map.layer_names(), vec!["first", "second"]);

        map.add_layer(service(3.0, "viridis"), "first");
        assert_eq!(map.len(), 2);
        assert_eq!(map.layer_names(), vec!["first", "second"]);

        let info = map.layers_info();
        assert_eq!(info[0].colormap, "viridis");
        assert_eq!(info[0].value_range, (3.0, 3.0));
        assert_eq!(info[1].tile_size, 4);
    }

    #[test]
    fn test_remove_layer() {
        let map = InteractiveMap::new();
        map.add_layer(service(1.0, "gray"), "only");
        assert!(map.layer("only").is_some());
        assert!(map.remove_layer("only"));
        assert!(!map.remove_layer("only"));
        assert!(map.layer("only").is_none());
    }
}
