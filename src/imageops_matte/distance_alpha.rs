use image::{ImageBuffer, Rgb, Rgba};
use imageproc::definitions::Image;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::imageops_matte::params::Thresholds;
use crate::utils::{quantize_unit, smoothstep};
use crate::AlphaMask;

/// Squared Euclidean RGB distance between two colours.
#[inline]
#[must_use]
pub fn color_distance_squared(Rgb([r1, g1, b1]): Rgb<u8>, Rgb([r2, g2, b2]): Rgb<u8>) -> u32 {
    let dr = i32::from(r1) - i32::from(r2);
    let dg = i32::from(g1) - i32::from(g2);
    let db = i32::from(b1) - i32::from(b2);
    (dr * dr + dg * dg + db * db) as u32
}

/// Opacity for a squared distance from the background.
///
/// 0 at or below `tol2`, 255 at or above `soft2`, smoothstep in between,
/// rounded to 8 bits. When feathering pulls `soft2` below `tol2` the
/// transition collapses to a step at `tol2`.
#[inline]
#[must_use]
pub fn alpha_for_distance(d2: u32, thresholds: &Thresholds) -> u8 {
    quantize_unit(smoothstep(thresholds.tol2, thresholds.soft2, d2 as f32))
}

/// Trait for building a soft alpha mask from colour distance to a background.
pub trait AlphaFromDistanceExt {
    /// Builds an alpha mask with one value per pixel.
    ///
    /// The input alpha channel is ignored. Output is a pure function of the
    /// colour channels, `background` and `thresholds`.
    ///
    /// # Examples
    ///
    /// ```
    /// use image::{Rgb, Rgba};
    /// use imageops_matte::{AlphaFromDistanceExt, Image, Thresholds};
    ///
    /// let mut image: Image<Rgba<u8>> = Image::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
    /// image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
    ///
    /// let thresholds = Thresholds::new(35.0, 55.0, 2.5);
    /// let mask = image.alpha_from_distance(Rgb([255, 255, 255]), &thresholds);
    /// assert_eq!(mask.as_raw(), &vec![0, 255]);
    /// ```
    fn alpha_from_distance(&self, background: Rgb<u8>, thresholds: &Thresholds) -> AlphaMask;
}

impl AlphaFromDistanceExt for Image<Rgba<u8>> {
    fn alpha_from_distance(&self, background: Rgb<u8>, thresholds: &Thresholds) -> AlphaMask {
        let (width, height) = self.dimensions();
        let mut mask: AlphaMask = ImageBuffer::new(width, height);
        if width == 0 || height == 0 {
            return mask;
        }

        let fill_row = |(alpha_row, pixel_row): (&mut [u8], &[u8])| {
            for (alpha, pixel) in alpha_row.iter_mut().zip(pixel_row.chunks_exact(4)) {
                let d2 = color_distance_squared(Rgb([pixel[0], pixel[1], pixel[2]]), background);
                *alpha = alpha_for_distance(d2, thresholds);
            }
        };

        let row_len = width as usize;

        #[cfg(feature = "rayon")]
        mask.par_chunks_mut(row_len)
            .zip(self.par_chunks(row_len * 4))
            .for_each(fill_row);

        #[cfg(not(feature = "rayon"))]
        mask.chunks_mut(row_len)
            .zip(self.chunks(row_len * 4))
            .for_each(fill_row);

        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: Thresholds = Thresholds {
        tol2: 1225.0,
        soft2: 5312.5,
    };

    #[test]
    fn distance_is_squared_euclidean() {
        assert_eq!(color_distance_squared(Rgb([0, 0, 0]), Rgb([0, 0, 0])), 0);
        assert_eq!(color_distance_squared(Rgb([3, 4, 0]), Rgb([0, 0, 0])), 25);
        assert_eq!(
            color_distance_squared(Rgb([0, 0, 0]), Rgb([255, 255, 255])),
            3 * 65025
        );
        assert_eq!(
            color_distance_squared(Rgb([10, 20, 30]), Rgb([30, 20, 10])),
            color_distance_squared(Rgb([30, 20, 10]), Rgb([10, 20, 30]))
        );
    }

    #[test]
    fn alpha_is_zero_at_or_below_tolerance() {
        assert_eq!(alpha_for_distance(0, &DEFAULTS), 0);
        assert_eq!(alpha_for_distance(1225, &DEFAULTS), 0);
    }

    #[test]
    fn alpha_saturates_at_soft_bound() {
        assert_eq!(alpha_for_distance(5313, &DEFAULTS), 255);
        assert_eq!(alpha_for_distance(65025, &DEFAULTS), 255);
        assert_eq!(alpha_for_distance(u32::from(u16::MAX) * 3, &DEFAULTS), 255);
    }

    #[test]
    fn alpha_follows_smoothstep_between_bounds() {
        let midpoint = ((1225.0 + 5312.5) / 2.0) as u32;
        let alpha = alpha_for_distance(midpoint, &DEFAULTS);
        assert!((127..=128).contains(&alpha), "got {alpha}");

        let low = alpha_for_distance(1600, &DEFAULTS);
        assert!(low > 0 && low < 64, "got {low}");
    }

    #[test]
    fn alpha_is_monotonic_in_distance() {
        let mut previous = 0;
        for d2 in (0..8000).step_by(7) {
            let alpha = alpha_for_distance(d2, &DEFAULTS);
            assert!(alpha >= previous, "alpha dropped at d2 = {d2}");
            previous = alpha;
        }
    }

    #[test]
    fn feather_below_midpoint_collapses_to_step() {
        // tol 35, hard 55, feather 0.5: soft2 = 1062.5 < tol2
        let thresholds = Thresholds::new(35.0, 55.0, 0.5);
        assert!(thresholds.soft2 < thresholds.tol2);
        assert_eq!(alpha_for_distance(1225, &thresholds), 0);
        assert_eq!(alpha_for_distance(1226, &thresholds), 255);
    }

    #[test]
    fn mask_matches_image_dimensions_and_ignores_input_alpha() {
        let mut image: Image<Rgba<u8>> = Image::from_pixel(3, 2, Rgba([20, 20, 20, 0]));
        image.put_pixel(2, 1, Rgba([200, 200, 200, 0]));

        let mask = image.alpha_from_distance(Rgb([20, 20, 20]), &DEFAULTS);
        assert_eq!(mask.dimensions(), (3, 2));
        assert_eq!(mask.as_raw(), &vec![0, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn empty_image_gives_empty_mask() {
        let image: Image<Rgba<u8>> = Image::new(0, 5);
        let mask = image.alpha_from_distance(Rgb([0, 0, 0]), &DEFAULTS);
        assert_eq!(mask.dimensions(), (0, 5));
        assert!(mask.as_raw().is_empty());
    }
}
