//! Test utilities for imageops-matte
//!
//! Fixture builders and tolerant comparisons shared by the unit tests.
//! Only compiled when running tests.

use image::{Pixel, Primitive, Rgba};
use imageproc::definitions::Image;

/// Creates a 2x2 RGBA image with known pixel values:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
///
/// The input alpha is deliberately varied; matting must ignore it.
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates an image filled with a single colour.
pub fn create_solid_image(width: u32, height: u32, color: Rgba<u8>) -> Image<Rgba<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates a subject-on-backdrop image.
///
/// Pixels within `border_width` of any edge get `border`, the rest get `center`.
pub fn create_bordered_image(
    width: u32,
    height: u32,
    border_width: u32,
    border: Rgba<u8>,
    center: Rgba<u8>,
) -> Image<Rgba<u8>> {
    Image::from_fn(width, height, |x, y| {
        let inside = x >= border_width
            && y >= border_width
            && x + border_width < width
            && y + border_width < height;
        if inside {
            center
        } else {
            border
        }
    })
}

/// Compares two pixels channel by channel within `tolerance`.
pub fn pixels_approx_equal<P>(expected: P, actual: P, tolerance: f32) -> bool
where
    P: Pixel,
    P::Subpixel: Primitive,
    f32: From<P::Subpixel>,
{
    expected.channels().len() == actual.channels().len()
        && expected
            .channels()
            .iter()
            .zip(actual.channels())
            .all(|(&e, &a)| (f32::from(e) - f32::from(a)).abs() <= tolerance)
}

/// Compares two images pixel by pixel within `tolerance`.
///
/// Returns `false` when the dimensions differ.
pub fn images_approx_equal<P>(expected: &Image<P>, actual: &Image<P>, tolerance: f32) -> bool
where
    P: Pixel,
    P::Subpixel: Primitive,
    f32: From<P::Subpixel>,
{
    expected.dimensions() == actual.dimensions()
        && expected
            .pixels()
            .zip(actual.pixels())
            .all(|(&e, &a)| pixels_approx_equal(e, a, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_with_valid_input_creates_image() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn create_bordered_image_places_border_and_center() {
        let border = Rgba([255, 255, 255, 255]);
        let center = Rgba([255, 0, 0, 255]);
        let image = create_bordered_image(5, 4, 1, border, center);

        assert_eq!(image.get_pixel(0, 0), &border);
        assert_eq!(image.get_pixel(4, 3), &border);
        assert_eq!(image.get_pixel(1, 1), &center);
        assert_eq!(image.get_pixel(3, 2), &center);
        assert_eq!(image.pixels().filter(|&&p| p == center).count(), 6);
    }

    #[test]
    fn pixels_approx_equal_with_tolerant_comparison_returns_true() {
        let pixel1 = Rgba([100u8, 150, 200, 255]);
        let pixel2 = Rgba([101u8, 149, 201, 255]);
        let pixel3 = Rgba([105u8, 145, 205, 255]);

        assert!(pixels_approx_equal(pixel1, pixel2, 1.5));
        assert!(!pixels_approx_equal(pixel1, pixel3, 1.5));
    }

    #[test]
    fn images_approx_equal_with_tolerant_comparison_returns_true() {
        let image1 = create_solid_image(3, 3, Rgba([10, 20, 30, 40]));
        let mut image2 = image1.clone();
        image2.put_pixel(0, 0, Rgba([11, 20, 30, 40]));

        assert!(images_approx_equal(&image1, &image2, 1.5));
        assert!(!images_approx_equal(&image1, &image2, 0.5));
        let narrower = create_solid_image(2, 3, Rgba([10, 20, 30, 40]));
        assert!(!images_approx_equal(&image1, &narrower, 1.5));
    }
}
