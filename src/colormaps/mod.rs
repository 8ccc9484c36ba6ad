//! Colormap implementations for image generation.
//!
//! Break maps classify raw values (the NDVI ramp is one); sequential maps
//! stretch a value range over a gradient.

pub mod breaks;
pub mod colormap;
pub mod sequential;

pub use breaks::BreakMap;
pub use colormap::{get_colormap, unpack_rgba, Colormap, TRANSPARENT};
pub use sequential::{GradientColormap, Gray};
