use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use imageproc::definitions::Image;
use tracing::{debug, debug_span, trace};

use crate::error::{MattingError, Result};
use crate::imageops_matte::background::EstimateBackgroundExt;
use crate::imageops_matte::compositor::CompositeExt;
use crate::imageops_matte::despeckle::DespeckleExt;
use crate::imageops_matte::distance_alpha::AlphaFromDistanceExt;
use crate::imageops_matte::inter_area::FitWithinExt;
use crate::imageops_matte::params::{MattingParams, Thresholds};
use crate::utils::validate_non_empty_image;

/// Result of one matting request.
#[derive(Debug, Clone, PartialEq)]
pub struct MattingOutcome {
    /// RGBA output at the resized dimensions. Fully opaque when a matte was applied.
    pub image: Image<Rgba<u8>>,
    /// Background colour estimated from the border of the resized image.
    pub background: Rgb<u8>,
    /// Distance thresholds derived from the parameters.
    pub thresholds: Thresholds,
    /// Dimensions of the image before resizing.
    pub source_dimensions: (u32, u32),
}

impl MattingOutcome {
    #[must_use]
    pub fn into_image(self) -> Image<Rgba<u8>> {
        self.image
    }
}

/// Removes the background from an RGBA image.
///
/// Resizes to `params.max_dimension()`, estimates the background from the
/// border, builds the alpha mask from colour distance, despeckles it and
/// composites the result. Output is deterministic for identical input.
///
/// # Errors
///
/// * `MattingError::InvalidParameter` - the image has a zero dimension
/// * `MattingError::EmptyInput` - no border samples could be taken
/// * `MattingError::DimensionMismatch` - the mask does not match the image
///
/// # Examples
///
/// ```
/// use image::{Rgb, Rgba};
/// use imageops_matte::{remove_background, Image, MattingParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut image: Image<Rgba<u8>> = Image::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
/// for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
///     image.put_pixel(x, y, Rgba([255, 0, 0, 255]));
/// }
///
/// let params = MattingParams::builder().despeckle_rounds(0).build()?;
/// let outcome = remove_background(image, &params)?;
///
/// assert_eq!(outcome.background, Rgb([255, 255, 255]));
/// assert_eq!(outcome.image.get_pixel(1, 1)[3], 255);
/// assert_eq!(outcome.image.get_pixel(0, 0)[3], 0);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub fn remove_background(image: Image<Rgba<u8>>, params: &MattingParams) -> Result<MattingOutcome> {
    let source_dimensions = image.dimensions();
    let (width, height) = source_dimensions;
    validate_non_empty_image(width, height, "source image")?;

    let span = debug_span!("remove_background", width, height);
    let _guard = span.enter();

    let image = image.fit_within(params.max_dimension());
    trace!(dimensions = ?image.dimensions(), "source image fitted");

    let background = image.estimate_background()?;
    let thresholds = params.thresholds();
    debug!(
        background = ?background.0,
        tol2 = thresholds.tol2,
        soft2 = thresholds.soft2,
        "estimated background"
    );

    let alpha = image.alpha_from_distance(background, &thresholds);
    trace!("alpha mask built");

    let alpha = alpha.despeckle(params.despeckle_rounds());
    trace!(rounds = params.despeckle_rounds(), "alpha mask despeckled");

    let image = image.composite(&alpha, params.matte())?;
    debug!(
        dimensions = ?image.dimensions(),
        matte = ?params.matte(),
        "background removed"
    );

    Ok(MattingOutcome {
        image,
        background,
        thresholds,
        source_dimensions,
    })
}

/// Removes the background from a raw interleaved RGBA8 buffer.
///
/// # Errors
///
/// * `MattingError::InvalidParameter` - a dimension is zero or
///   `pixels.len() != width * height * 4`
/// * any error from [`remove_background`]
pub fn remove_background_raw(
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    params: &MattingParams,
) -> Result<MattingOutcome> {
    validate_non_empty_image(width, height, "source image")?;

    let expected = u64::from(width) * u64::from(height) * 4;
    let actual = pixels.len();
    let image: Image<Rgba<u8>> = ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
        MattingError::InvalidParameter(format!(
            "source image: {width}x{height} RGBA needs {expected} bytes, got {actual}"
        ))
    })?;

    remove_background(image, params)
}

/// Removes the background from any decoded image, converting it to RGBA8 first.
///
/// # Errors
///
/// Same as [`remove_background`].
pub fn remove_background_dynamic(
    image: DynamicImage,
    params: &MattingParams,
) -> Result<MattingOutcome> {
    remove_background(image.into_rgba8(), params)
}

/// Decodes an encoded image and removes its background.
///
/// Supported formats follow the enabled `image` codec features.
///
/// # Errors
///
/// * `MattingError::InvalidParameter` - `bytes` is empty or cannot be decoded
/// * any error from [`remove_background`]
pub fn remove_background_from_memory(
    bytes: &[u8],
    params: &MattingParams,
) -> Result<MattingOutcome> {
    if bytes.is_empty() {
        return Err(MattingError::InvalidParameter("source image: no data".to_string()));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| MattingError::InvalidParameter(format!("source image: {e}")))?;
    remove_background_dynamic(decoded, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imageops_matte::params::MatteColor;
    use crate::test_utils::{create_bordered_image, create_solid_image};

    fn no_despeckle() -> MattingParams {
        MattingParams::builder()
            .despeckle_rounds(0)
            .build()
            .unwrap()
    }

    #[test]
    fn four_by_four_scenario() {
        let image =
            create_bordered_image(4, 4, 1, Rgba([255, 255, 255, 255]), Rgba([255, 0, 0, 255]));
        let outcome = remove_background(image, &no_despeckle()).unwrap();

        assert_eq!(outcome.background, Rgb([255, 255, 255]));
        assert_eq!(outcome.source_dimensions, (4, 4));
        for (x, y, pixel) in outcome.image.enumerate_pixels() {
            let centre = (1..=2).contains(&x) && (1..=2).contains(&y);
            let expected = if centre {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 0])
            };
            assert_eq!(*pixel, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn uniform_image_is_fully_transparent() {
        for tol in [1.0, 35.0, 200.0] {
            let params = MattingParams::builder().tol(tol).hard(5.0).build().unwrap();
            let image = create_solid_image(16, 9, Rgba([90, 30, 200, 255]));
            let outcome = remove_background(image, &params).unwrap();
            assert!(outcome.image.pixels().all(|p| p[3] == 0));
        }
    }

    #[test]
    fn large_images_are_resized_before_matting() {
        let params = MattingParams::builder().max_dimension(128).build().unwrap();
        let (black, white) = (Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 255]));
        let image = create_bordered_image(512, 256, 64, black, white);
        let outcome = remove_background(image, &params).unwrap();

        assert_eq!(outcome.source_dimensions, (512, 256));
        assert_eq!(outcome.image.dimensions(), (128, 64));
        assert_eq!(outcome.image.get_pixel(0, 0)[3], 0);
        assert_eq!(outcome.image.get_pixel(64, 32)[3], 255);
    }

    #[test]
    fn matte_makes_output_opaque() {
        let params = MattingParams::builder()
            .despeckle_rounds(0)
            .matte(MatteColor::new(0, 255, 0))
            .build()
            .unwrap();
        let image =
            create_bordered_image(4, 4, 1, Rgba([255, 255, 255, 255]), Rgba([255, 0, 0, 255]));
        let outcome = remove_background(image, &params).unwrap();

        assert!(outcome.image.pixels().all(|p| p[3] == 255));
        assert_eq!(outcome.image.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(outcome.image.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn zero_sized_images_are_invalid() {
        let image: Image<Rgba<u8>> = ImageBuffer::new(0, 10);
        assert!(matches!(
            remove_background(image, &MattingParams::default()),
            Err(MattingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn raw_buffer_length_is_validated() {
        let params = MattingParams::default();
        assert!(matches!(
            remove_background_raw(2, 2, vec![0; 15], &params),
            Err(MattingError::InvalidParameter(_))
        ));
        assert!(matches!(
            remove_background_raw(0, 2, vec![], &params),
            Err(MattingError::InvalidParameter(_))
        ));

        let outcome = remove_background_raw(2, 2, vec![7; 16], &params).unwrap();
        assert_eq!(outcome.image.dimensions(), (2, 2));
    }

    #[test]
    fn dynamic_images_are_converted_to_rgba() {
        let rgb = image::RgbImage::from_pixel(3, 3, Rgb([10, 10, 10]));
        let params = MattingParams::default();
        let outcome = remove_background_dynamic(DynamicImage::ImageRgb8(rgb), &params).unwrap();
        assert!(outcome.image.pixels().all(|p| *p == Rgba([10, 10, 10, 0])));
    }

    #[test]
    fn undecodable_bytes_are_invalid() {
        let params = MattingParams::default();
        assert!(matches!(
            remove_background_from_memory(&[], &params),
            Err(MattingError::InvalidParameter(_))
        ));
        assert!(matches!(
            remove_background_from_memory(b"definitely not an image", &params),
            Err(MattingError::InvalidParameter(_))
        ));
    }
}
