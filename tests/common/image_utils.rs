//! Image utilities for testing.
//!
//! Helpers for checking the PNG tiles and figures produced by musa.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba};

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Decode PNG bytes, checking the format first
pub fn decode_png(bytes: &[u8]) -> Result<DynamicImage, String> {
    match detect_image_format(bytes) {
        Some(ImageFormat::Png) => {
            image::load_from_memory(bytes).map_err(|e| format!("Failed to decode PNG: {}", e))
        }
        other => Err(format!("Expected a PNG, found {:?}", other)),
    }
}

/// Check if an image has the expected dimensions
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }

    Ok(())
}

/// Number of fully transparent pixels
pub fn count_transparent(image: &DynamicImage) -> usize {
    image.pixels().filter(|(_, _, Rgba(p))| p[3] == 0).count()
}

/// Distinct opaque colors in an image
pub fn opaque_colors(image: &DynamicImage) -> Vec<[u8; 4]> {
    let mut colors: Vec<[u8; 4]> = image
        .pixels()
        .map(|(_, _, Rgba(p))| p)
        .filter(|p| p[3] > 0)
        .collect();
    colors.sort_unstable();
    colors.dedup();
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, RgbaImage};

    fn sample() -> DynamicImage {
        let img: RgbaImage = ImageBuffer::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([10, 20, 30, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_decode_png() {
        let mut png_bytes = Vec::new();
        sample()
            .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();

        let decoded = decode_png(&png_bytes).unwrap();
        assert!(assert_image_dimensions(&decoded, 4, 2).is_ok());
        assert!(assert_image_dimensions(&decoded, 2, 4).is_err());
        assert!(decode_png(b"not an image").is_err());
    }

    #[test]
    fn test_pixel_counts() {
        let img = sample();
        assert_eq!(count_transparent(&img), 4);
        assert_eq!(opaque_colors(&img), vec![[10, 20, 30, 255]]);
    }
}
