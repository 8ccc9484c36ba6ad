//! USDA Cropland Data Layer (CDL) categories.
//!
//! CDL rasters store a category code per pixel. A few category names are
//! used by more than one code ("Barren" and "Shrubland"); the reverse lookups
//! report those names instead of picking one of the codes.
//!
//! Names carry no surrounding whitespace: code 112 is `"Perennial Ice/Snow"`,
//! without the trailing space found in some published CDL tables. Name
//! lookups trim their argument, so either spelling resolves.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::error::{MusaError, Result};

/// Every CDL code with its category name
const CDL_CATEGORIES: [(u16, &str); 132] = [
    (0, "Background"),
    (1, "Corn"),
    (2, "Cotton"),
    (3, "Rice"),
    (4, "Sorghum"),
    (5, "Soybeans"),
    (6, "Sunflower"),
    (10, "Peanuts"),
    (11, "Tobacco"),
    (12, "Sweet Corn"),
    (13, "Pop or Orn Corn"),
    (14, "Mint"),
    (21, "Barley"),
    (22, "Durum Wheat"),
    (23, "Spring Wheat"),
    (24, "Winter Wheat"),
    (25, "Other Small Grains"),
    (26, "Dbl Crop WinWht/Soybeans"),
    (27, "Rye"),
    (28, "Oats"),
    (29, "Millet"),
    (30, "Speltz"),
    (31, "Canola"),
    (32, "Flaxseed"),
    (33, "Safflower"),
    (34, "Rape Seed"),
    (35, "Mustard"),
    (36, "Alfalfa"),
    (37, "Other Hay/Non Alfalfa"),
    (38, "Camelina"),
    (39, "Buckwheat"),
    (41, "Sugarbeets"),
    (42, "Dry Beans"),
    (43, "Potatoes"),
    (44, "Other Crops"),
    (45, "Sugarcane"),
    (46, "Sweet Potatoes"),
    (47, "Misc Vegs & Fruits"),
    (48, "Watermelons"),
    (49, "Onions"),
    (50, "Cucumbers"),
    (51, "Chick Peas"),
    (52, "Lentils"),
    (53, "Peas"),
    (54, "Tomatoes"),
    (55, "Caneberries"),
    (56, "Hops"),
    (57, "Herbs"),
    (58, "Clover/Wildflowers"),
    (59, "Sod/Grass Seed"),
    (60, "Switchgrass"),
    (61, "Fallow/Idle Cropland"),
    (63, "Forest"),
    (64, "Shrubland"),
    (65, "Barren"),
    (66, "Cherries"),
    (67, "Peaches"),
    (68, "Apples"),
    (69, "Grapes"),
    (70, "Christmas Trees"),
    (71, "Other Tree Crops"),
    (72, "Citrus"),
    (74, "Pecans"),
    (75, "Almonds"),
    (76, "Walnuts"),
    (77, "Pears"),
    (81, "Clouds/No Data"),
    (82, "Developed"),
    (83, "Water"),
    (87, "Wetlands"),
    (88, "Nonag/Undefined"),
    (92, "Aquaculture"),
    (111, "Open Water"),
    (112, "Perennial Ice/Snow"),
    (121, "Developed/Open Space"),
    (122, "Developed/Low Intensity"),
    (123, "Developed/Med Intensity"),
    (124, "Developed/High Intensity"),
    (131, "Barren"),
    (141, "Deciduous Forest"),
    (142, "Evergreen Forest"),
    (143, "Mixed Forest"),
    (152, "Shrubland"),
    (176, "Grassland/Pasture"),
    (190, "Woody Wetlands"),
    (195, "Herbaceous Wetlands"),
    (204, "Pistachios"),
    (205, "Triticale"),
    (206, "Carrots"),
    (207, "Asparagus"),
    (208, "Garlic"),
    (209, "Cantaloupes"),
    (210, "Prunes"),
    (211, "Olives"),
    (212, "Oranges"),
    (213, "Honeydew Melons"),
    (214, "Broccoli"),
    (216, "Peppers"),
    (217, "Pomegranates"),
    (218, "Nectarines"),
    (219, "Greens"),
    (220, "Plums"),
    (221, "Strawberries"),
    (222, "Squash"),
    (223, "Apricots"),
    (224, "Vetch"),
    (225, "Dbl Crop WinWht/Corn"),
    (226, "Dbl Crop Oats/Corn"),
    (227, "Lettuce"),
    (229, "Pumpkins"),
    (230, "Dbl Crop Lettuce/Durum Wht"),
    (231, "Dbl Crop Lettuce/Cantaloupe"),
    (232, "Dbl Crop Lettuce/Cotton"),
    (233, "Dbl Crop Lettuce/Barley"),
    (234, "Dbl Crop Durum Wht/Sorghum"),
    (235, "Dbl Crop Barley/Sorghum"),
    (236, "Dbl Crop WinWht/Sorghum"),
    (237, "Dbl Crop Barley/Corn"),
    (238, "Dbl Crop WinWht/Cotton"),
    (239, "Dbl Crop Soybeans/Cotton"),
    (240, "Dbl Crop Soybeans/Oats"),
    (241, "Dbl Crop Corn/Soybeans"),
    (242, "Blueberries"),
    (243, "Cabbage"),
    (244, "Cauliflower"),
    (245, "Celery"),
    (246, "Radishes"),
    (247, "Turnips"),
    (248, "Eggplants"),
    (249, "Gourds"),
    (250, "Cranberries"),
    (254, "Dbl Crop Barley/Soybeans"),
];

static VALUES_TO_CROPS: Lazy<BTreeMap<u16, &'static str>> =
    Lazy::new(|| CDL_CATEGORIES.iter().copied().collect());

/// Every code of each category name, ascending
static CROP_CODES: Lazy<BTreeMap<&'static str, Vec<u16>>> = Lazy::new(|| {
    let mut codes: BTreeMap<&'static str, Vec<u16>> = BTreeMap::new();
    for (code, name) in VALUES_TO_CROPS.iter() {
        codes.entry(*name).or_default().push(*code);
    }
    codes
});

static CROPS_TO_VALUES: Lazy<BTreeMap<&'static str, u16>> = Lazy::new(|| {
    CROP_CODES
        .iter()
        .filter(|(_, codes)| codes.len() == 1)
        .map(|(name, codes)| (*name, codes[0]))
        .collect()
});

/// Map from CDL code to category name
pub fn cdl_values_to_crops() -> &'static BTreeMap<u16, &'static str> {
    &VALUES_TO_CROPS
}

/// Map from category name to CDL code, for names with a single code
pub fn crops_to_cdl_values() -> &'static BTreeMap<&'static str, u16> {
    &CROPS_TO_VALUES
}

/// Category name of a CDL code
pub fn crop_name(code: u16) -> Option<&'static str> {
    VALUES_TO_CROPS.get(&code).copied()
}

/// The CDL code of a category name.
///
/// Fails with [`MusaError::AmbiguousCropName`] for names shared by several
/// codes and [`MusaError::InvalidParameter`] for unknown names.
pub fn crop_code(name: &str) -> Result<u16> {
    let name = name.trim();
    match CROP_CODES.get(name).map(Vec::as_slice) {
        Some([code]) => Ok(*code),
        Some(codes) => Err(MusaError::AmbiguousCropName {
            name: name.to_string(),
            codes: codes.to_vec(),
        }),
        None => Err(MusaError::InvalidParameter {
            param: "name".to_string(),
            message: format!("Unknown CDL category: {}", name),
        }),
    }
}

/// Every CDL code of a category name; empty for unknown names
pub fn crop_codes(name: &str) -> &'static [u16] {
    CROP_CODES.get(name.trim()).map(Vec::as_slice).unwrap_or(&[])
}

/// Category names shared by more than one code, with their codes
pub fn ambiguous_crop_names() -> Vec<(&'static str, &'static [u16])> {
    CROP_CODES
        .iter()
        .filter(|(_, codes)| codes.len() > 1)
        .map(|(name, codes)| (*name, codes.as_slice()))
        .collect()
}
