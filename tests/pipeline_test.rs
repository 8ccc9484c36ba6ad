//! Library-level tests of the notebook helpers working together.

mod common;

use common::{assertions, image_utils, test_data};
use geo::{Geometry, Point};
use pretty_assertions::assert_eq;

use musa::config::DisplayConfig;
use musa::data_loader::load_bands;
use musa::{
    bounds_to_polygon, compute_ndvi, crop_code, map_ndvi, reproject_geom, Bounds, Crs, Display,
    Histogram, InteractiveMap, MusaError,
};

#[test]
fn test_bands_to_ndvi() {
    let dir = tempfile::tempdir().unwrap();
    let (red_path, nir_path) = test_data::write_bands(dir.path(), 20, 6).unwrap();
    let (red, nir) = load_bands(&red_path, &nir_path).unwrap();

    let ndvi = compute_ndvi(red.view(), nir.view()).unwrap();
    let expected = test_data::expected_ndvi(20, 6);

    assert_eq!(ndvi.dim(), (6, 20));
    assertions::assert_grid_approx_eq(ndvi.view(), expected.view(), None);
    assertions::assert_finite_in_range(ndvi.view(), 0.19, 0.81);
    assert!(ndvi.row(0).iter().all(|v| v.is_nan()));
}

#[test]
fn test_map_ndvi_on_global_context() {
    let dir = tempfile::tempdir().unwrap();
    let (red_path, nir_path) = test_data::write_bands(dir.path(), 16, 16).unwrap();
    let (red, nir) = load_bands(&red_path, &nir_path).unwrap();
    let ndvi = compute_ndvi(red.view(), nir.view()).unwrap();

    let map = InteractiveMap::new();
    let (left, bottom, right, top) = test_data::SCENE_BOUNDS;
    map_ndvi(&map, ndvi.view(), Bounds::new(left, bottom, right, top), &Crs::wgs84()).unwrap();

    // Rendering again replaces the layer rather than stacking a second one
    map_ndvi(&map, ndvi.view(), Bounds::new(left, bottom, right, top), &Crs::wgs84()).unwrap();
    assert_eq!(map.layer_names(), vec!["ndvi".to_string()]);
    assert_eq!(musa::context::constructions(), 1);

    let service = map.layer("ndvi").unwrap();
    let png = service.render_png(0, 0, 0).unwrap().unwrap();
    let img = image_utils::decode_png(&png).unwrap();
    assert!(image_utils::assert_image_dimensions(&img, 256, 256).is_ok());
}

#[test]
fn test_scene_outline_to_web_mercator() {
    let (left, bottom, right, top) = test_data::SCENE_BOUNDS;
    let outline = bounds_to_polygon(&Bounds::new(left, bottom, right, top));
    assert_eq!(outline.exterior().0.len(), 5);

    let projected = reproject_geom(
        &Geometry::Polygon(outline.clone()),
        &Crs::wgs84(),
        &"EPSG:3857".parse().unwrap(),
    )
    .unwrap();

    let Geometry::Polygon(projected) = projected else {
        panic!("reprojection changed the geometry type");
    };
    let first = projected.exterior().0[0];
    assertions::assert_approx_eq(first.x, -93.5 * 20_037_508.342_789_244 / 180.0, Some(1e-3));
    assert!(first.y > 5_000_000.0);

    // And back again
    let restored = reproject_geom(
        &Geometry::Polygon(projected),
        &Crs::web_mercator(),
        &Crs::wgs84(),
    )
    .unwrap();
    let Geometry::Polygon(restored) = restored else {
        panic!("reprojection changed the geometry type");
    };
    for (a, b) in restored.exterior().0.iter().zip(outline.exterior().0.iter()) {
        assertions::assert_approx_eq(a.x, b.x, Some(1e-7));
        assertions::assert_approx_eq(a.y, b.y, Some(1e-7));
    }
}

#[test]
fn test_reproject_rejects_unknown_crs() {
    let point = Geometry::Point(Point::new(1.0, 2.0));
    let result = reproject_geom(&point, &Crs::wgs84(), &Crs::Proj4("+proj=nonsense".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_display_figures() {
    let dir = tempfile::tempdir().unwrap();
    let display = Display::new(&DisplayConfig {
        output_dir: dir.path().to_path_buf(),
    });

    let red = test_data::red_band(10, 10);
    let band = ndarray::Array2::from_shape_vec((10, 10), red.into_raw()).unwrap();

    let histogram = Histogram::compute(band.view(), Some(0.0));
    assert_eq!(histogram.total(), 90);
    assert_eq!(histogram.bins(), 1);

    let path = display.show_histogram(band.view(), Some(0.0)).unwrap();
    let img = image_utils::decode_png(&std::fs::read(&path).unwrap()).unwrap();
    assert!(image_utils::assert_image_dimensions(&img, 800, 600).is_ok());

    let path = display.show_image(band.view(), "gray").unwrap();
    let img = image_utils::decode_png(&std::fs::read(&path).unwrap()).unwrap();
    assert!(image_utils::assert_image_dimensions(&img, 1600, 1600).is_ok());
}

#[test]
fn test_crop_lookup() {
    assert_eq!(crop_code("Soybeans").unwrap(), 5);
    assert!(matches!(
        crop_code("Barren"),
        Err(MusaError::AmbiguousCropName { .. })
    ));
}
