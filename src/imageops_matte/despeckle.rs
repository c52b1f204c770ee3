use image::{ImageBuffer, Luma};
use imageproc::definitions::Image;
use tracing::trace;

use crate::imageops_matte::box_filter::map_windows;
use crate::imageops_matte::summed_area_table::SummedAreaTable;
use crate::utils::{quantize_unit, smoothstep};

/// Radius of the blur applied in each round (3x3 window).
pub const DESPECKLE_RADIUS: u32 = 1;
/// Normalized opacity at or below which a blurred pixel becomes transparent.
pub const RETHRESHOLD_LOW: f32 = 0.35;
/// Normalized opacity at or above which a blurred pixel becomes opaque.
pub const RETHRESHOLD_HIGH: f32 = 0.65;

/// Trait for removing isolated noise from an alpha mask.
pub trait DespeckleExt {
    /// Runs `rounds` sequential rounds of 3x3 box blur followed by a
    /// smoothstep re-threshold between 0.35 and 0.65.
    ///
    /// Isolated pixels that disagree with their neighbourhood are flipped,
    /// while straight edges and the soft band between the thresholds
    /// survive. Zero rounds returns the mask unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use image::{ImageBuffer, Luma};
    /// use imageops_matte::{DespeckleExt, Image};
    ///
    /// let mut mask: Image<Luma<u8>> = ImageBuffer::new(5, 5);
    /// mask.put_pixel(2, 2, Luma([255]));
    ///
    /// let cleaned = mask.despeckle(1);
    /// assert!(cleaned.pixels().all(|p| p[0] == 0));
    /// ```
    #[must_use]
    fn despeckle(self, rounds: u8) -> Self;
}

impl DespeckleExt for Image<Luma<u8>> {
    fn despeckle(self, rounds: u8) -> Self {
        let (width, height) = self.dimensions();
        if rounds == 0 || width == 0 || height == 0 {
            return self;
        }

        // round k reads `front` and writes `back`, then the two swap
        let mut front = self;
        let mut back: Image<Luma<u8>> = ImageBuffer::new(width, height);
        let mut sat = SummedAreaTable::default();

        for round in 0..rounds {
            sat.rebuild(&front);
            let values: &mut [u8] = &mut back;
            map_windows(
                &sat,
                values,
                DESPECKLE_RADIUS,
                DESPECKLE_RADIUS,
                rethreshold,
            );
            std::mem::swap(&mut front, &mut back);
            trace!(round, width, height, "despeckle round complete");
        }

        front
    }
}

/// Re-hardens a blurred 0..=255 mean back to an 8-bit opacity.
#[inline]
fn rethreshold(mean: f32) -> u8 {
    quantize_unit(smoothstep(RETHRESHOLD_LOW, RETHRESHOLD_HIGH, mean / 255.0))
}
