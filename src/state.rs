//! Application state management for musa.
//!
//! This module defines the shared state that is passed to all handlers:
//! the configuration, the interactive map holding the tile layers, and a
//! summary of the compute context that rendered them.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::context::{ComputeContext, ContextInfo};
use crate::error::{MusaError, Result};
use crate::map::InteractiveMap;
use crate::tiling::TileService;

/// The main application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Map whose layers are served as tiles
    pub map: Arc<InteractiveMap>,
    /// Summary of the compute context
    pub context: ContextInfo,
    /// When the state was created, for uptime reporting
    pub started: Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Config, map: Arc<InteractiveMap>, context: &ComputeContext) -> Self {
        Self {
            config,
            map,
            context: context.info(),
            started: Instant::now(),
        }
    }

    /// Create a new AppState wrapped in an Arc for shared ownership
    pub fn new_shared(
        config: Config,
        map: Arc<InteractiveMap>,
        context: &ComputeContext,
    ) -> Arc<Self> {
        Arc::new(Self::new(config, map, context))
    }

    /// Get a layer by name with error handling
    pub fn get_layer_checked(&self, name: &str) -> Result<Arc<TileService>> {
        self.map.layer(name).ok_or_else(|| MusaError::InvalidParameter {
            param: "layer".to_string(),
            message: format!(
                "Unknown layer: {}. Available layers: {}",
                name,
                self.map.layer_names().join(", ")
            ),
        })
    }

    /// Whether the status endpoint is exposed
    pub fn ui_enabled(&self) -> bool {
        self.context.ui_enabled
    }
}
