//! NDVI computation and rendering.

use ndarray::{Array, ArrayView, ArrayView2, Dimension, Zip};
use std::time::Instant;
use tracing::info;

use crate::colormaps::BreakMap;
use crate::config::TilingConfig;
use crate::context::{init_context, ComputeContext};
use crate::crs::Crs;
use crate::error::{MusaError, Result};
use crate::interpolation::ResampleMethod;
use crate::map::InteractiveMap;
use crate::raster::{Bounds, ProjectedExtent};
use crate::tiling::{GlobalLayout, HashPartitionStrategy, Pyramid, RasterLayer, TileService};

/// Name of the map layer NDVI is rendered to
pub const NDVI_LAYER: &str = "ndvi";

/// Cell value treated as no-data in NDVI rasters
pub const NDVI_NO_DATA: f64 = 0.0;

/// Breaks and colors of the NDVI ramp, white-yellow through dark green
const NDVI_BREAKS: [(f64, u32); 9] = [
    (0.05, 0xffffe5aa),
    (0.1, 0xf7fcb9ff),
    (0.2, 0xd9f0a3ff),
    (0.3, 0xaddd8eff),
    (0.4, 0x78c679ff),
    (0.5, 0x41ab5dff),
    (0.6, 0x238443ff),
    (0.7, 0x006837ff),
    (1.0, 0x004529ff),
];

/// The nine-stop NDVI color ramp
pub fn ndvi_color_map() -> BreakMap {
    BreakMap::from_sorted_breaks(NDVI_LAYER, &NDVI_BREAKS)
}

/// Normalized difference vegetation index, `(ir - r) / (ir + r)`.
///
/// Cells that are exactly 0 in either band are no-data and come out as
/// `NaN`, as do cells where both bands cancel.
pub fn compute_ndvi<T, D>(r: ArrayView<T, D>, ir: ArrayView<T, D>) -> Result<Array<f64, D>>
where
    T: Copy + Into<f64>,
    D: Dimension,
{
    if r.shape() != ir.shape() {
        return Err(MusaError::ShapeMismatch {
            left: r.shape().to_vec(),
            right: ir.shape().to_vec(),
        });
    }

    Ok(Zip::from(&r).and(&ir).map_collect(|&red, &nir| {
        let red: f64 = red.into();
        let nir: f64 = nir.into();
        if red == 0.0 || nir == 0.0 || nir + red == 0.0 {
            f64::NAN
        } else {
            (nir - red) / (nir + red)
        }
    }))
}

/// Render an NDVI array onto `map` as the `"ndvi"` layer.
///
/// Uses the global compute context, creating it on first use.
pub fn map_ndvi(map: &InteractiveMap, img: ArrayView2<f64>, bounds: Bounds, crs: &Crs) -> Result<()> {
    let context = init_context()?;
    map_ndvi_with(context, &TilingConfig::default(), map, img, bounds, crs)
}

/// [`map_ndvi`] on an explicit context and tiling configuration
pub fn map_ndvi_with(
    context: &ComputeContext,
    tiling: &TilingConfig,
    map: &InteractiveMap,
    img: ArrayView2<f64>,
    bounds: Bounds,
    crs: &Crs,
) -> Result<()> {
    tiling.validate()?;

    let start = Instant::now();
    let color_map = ndvi_color_map();
    let projection = Crs::Proj4(crs.to_proj4()?);
    let pyramid_method: ResampleMethod = tiling.resample_method.parse()?;

    let layer = RasterLayer::from_array(
        img,
        Some(NDVI_NO_DATA),
        ProjectedExtent::new(bounds, projection),
    )?;

    let tiled = layer.tile_to_layout(
        context,
        GlobalLayout::new(tiling.tile_size),
        &Crs::web_mercator(),
        HashPartitionStrategy::new(tiling.partitions)?,
        ResampleMethod::Nearest,
    )?;

    let pyramid = Pyramid::build(context, tiled, pyramid_method)?;
    let max_zoom = pyramid.max_zoom();
    map.add_layer(TileService::build(pyramid, Box::new(color_map)), NDVI_LAYER);

    info!(
        operation = "map_ndvi",
        max_zoom = max_zoom,
        rows = img.nrows(),
        cols = img.ncols(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "NDVI layer rendered"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormaps::{Colormap, TRANSPARENT};
    use crate::config::ComputeConfig;
    use ndarray::{array, Array2};

    #[test]
    fn test_compute_ndvi_masks_zeros() {
        let r = array![[0u16, 2]];
        let ir = array![[4u16, 4]];
        let ndvi = compute_ndvi(r.view(), ir.view()).unwrap();

        assert!(ndvi[[0, 0]].is_nan());
        assert!((ndvi[[0, 1]] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compute_ndvi_antisymmetric() {
        let a = array![[1.0f32, 5.0], [3.0, 7.0]];
        let b = array![[2.0f32, 1.0], [3.0, 9.0]];
        let ab = compute_ndvi(a.view(), b.view()).unwrap();
        let ba = compute_ndvi(b.view(), a.view()).unwrap();

        for (x, y) in ab.iter().zip(ba.iter()) {
            assert!((x + y).abs() < 1e-12);
        }
        // Equal bands give exactly zero
        assert_eq!(ab[[1, 0]], 0.0);
    }

    #[test]
    fn test_compute_ndvi_cancelling_bands() {
        let r = array![1i32, -3];
        let ir = array![-1i32, 1];
        let ndvi = compute_ndvi(r.view(), ir.view()).unwrap();
        assert!(ndvi[0].is_nan());
        assert_eq!(ndvi[1], -2.0);

        // Cancelling cells stay transparent on the ramp instead of reading as -inf
        let ramp = ndvi_color_map();
        assert!(ndvi.iter().all(|v| !v.is_infinite()));
        assert_eq!(ramp.color_for(ndvi[0]), TRANSPARENT);
    }

    #[test]
    fn test_compute_ndvi_shape_mismatch() {
        let r = Array2::<u8>::zeros((2, 3));
        let ir = Array2::<u8>::zeros((3, 2));
        match compute_ndvi(r.view(), ir.view()) {
            Err(MusaError::ShapeMismatch { left, right }) => {
                assert_eq!(left, vec![2, 3]);
                assert_eq!(right, vec![3, 2]);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_map_ndvi_with_rejects_bad_tiling() {
        let context = ComputeContext::new(&ComputeConfig {
            master: "local[1]".to_string(),
            ..Default::default()
        })
        .unwrap();
        let map = InteractiveMap::new();
        let img = Array2::from_elem((4, 4), 0.5);
        let bounds = Bounds::new(10.0, 40.0, 10.5, 40.5);

        for tiling in [
            TilingConfig {
                tile_size: 0,
                ..Default::default()
            },
            TilingConfig {
                partitions: 0,
                ..Default::default()
            },
        ] {
            let result = map_ndvi_with(&context, &tiling, &map, img.view(), bounds, &Crs::wgs84());
            assert!(matches!(result, Err(MusaError::Config { .. })));
        }
        assert!(map.is_empty());
    }

    #[test]
    fn test_ndvi_color_map() {
        let map = ndvi_color_map();
        assert_eq!(map.breaks().len(), 9);
        assert_eq!(map.color_for(0.0), [0xff, 0xff, 0xe5, 0xaa]);
        assert_eq!(map.color_for(0.15), [0xd9, 0xf0, 0xa3, 0xff]);
        assert_eq!(map.color_for(0.7), [0x00, 0x68, 0x37, 0xff]);
        assert_eq!(map.color_for(1.5), [0x00, 0x45, 0x29, 0xff]);
        assert_eq!(map.color_for(f64::NAN), TRANSPARENT);
        assert_eq!(map.name(), "ndvi");
    }

    #[test]
    fn test_map_ndvi_with_adds_layer() {
        let context = ComputeContext::new(&ComputeConfig {
            master: "local[2]".to_string(),
            ..Default::default()
        })
        .unwrap();
        let tiling = TilingConfig {
            partitions: 4,
            ..Default::default()
        };
        let map = InteractiveMap::new();
        let img = Array2::from_shape_fn((16, 16), |(r, c)| if r == c { 0.0 } else { 0.5 });

        map_ndvi_with(
            &context,
            &tiling,
            &map,
            img.view(),
            Bounds::new(10.0, 40.0, 10.5, 40.5),
            &Crs::wgs84(),
        )
        .unwrap();

        assert_eq!(map.layer_names(), vec![NDVI_LAYER]);
        let service = map.layer(NDVI_LAYER).unwrap();
        assert_eq!(service.colormap_name(), "ndvi");
        assert_eq!(service.pyramid().min_zoom(), 0);
        assert_eq!(service.tile_size(), 256);

        // Zoom 0 holds the whole layer and renders to a 256x256 PNG
        let png = service.render_png(0, 0, 0).unwrap().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_map_ndvi_rejects_bad_bounds() {
        let map = InteractiveMap::new();
        let img = Array2::from_elem((4, 4), 0.3);
        let result = map_ndvi(&map, img.view(), Bounds::new(1.0, 0.0, 0.0, 1.0), &Crs::wgs84());
        assert!(result.is_err());
        assert!(map.is_empty());
    }
}
