use image::{Luma, Rgb, Rgba};
use imageproc::definitions::Image;
use itertools::Itertools;

use crate::error::Result;
use crate::imageops_matte::params::MatteColor;
use crate::utils::{lerp, validate_matching_dimensions};
use crate::AlphaMask;

/// Trait for merging an image with its final alpha mask.
pub trait CompositeExt {
    /// Replaces the alpha channel with `mask`, or flattens onto `matte`.
    ///
    /// Without a matte the colour channels are kept verbatim and the alpha
    /// channel is taken from the mask. With a matte every pixel becomes
    /// `lerp(matte, colour, alpha / 255)` with alpha 255. The image is
    /// modified in place and returned.
    ///
    /// # Errors
    ///
    /// * `MattingError::DimensionMismatch` - image and mask sizes differ
    ///
    /// # Examples
    ///
    /// ```
    /// use image::{ImageBuffer, Luma, Rgba};
    /// use imageops_matte::{CompositeExt, Image, MatteColor};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgba<u8>> = ImageBuffer::from_pixel(1, 1, Rgba([200, 100, 0, 255]));
    /// let mask: Image<Luma<u8>> = ImageBuffer::from_pixel(1, 1, Luma([0]));
    ///
    /// let flattened = image.composite(&mask, Some(MatteColor::new(0, 0, 255)))?;
    /// assert_eq!(flattened.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    fn composite(self, mask: &AlphaMask, matte: Option<MatteColor>) -> Result<Self>
    where
        Self: Sized;

    /// Replaces the alpha channel with `mask` in place.
    ///
    /// # Errors
    ///
    /// * `MattingError::DimensionMismatch` - image and mask sizes differ
    fn replace_alpha_mut(&mut self, mask: &AlphaMask) -> Result<&mut Self>;

    /// Blends every pixel over `matte` using `mask` as weight and makes it opaque.
    ///
    /// # Errors
    ///
    /// * `MattingError::DimensionMismatch` - image and mask sizes differ
    fn flatten_onto_mut(&mut self, mask: &AlphaMask, matte: MatteColor) -> Result<&mut Self>;
}

impl CompositeExt for Image<Rgba<u8>> {
    fn composite(mut self, mask: &AlphaMask, matte: Option<MatteColor>) -> Result<Self> {
        match matte {
            Some(matte) => self.flatten_onto_mut(mask, matte)?,
            None => self.replace_alpha_mut(mask)?,
        };
        Ok(self)
    }

    fn replace_alpha_mut(&mut self, mask: &AlphaMask) -> Result<&mut Self> {
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;

        self.pixels_mut()
            .zip_eq(mask.pixels())
            .for_each(|(pixel, &Luma([alpha]))| pixel[3] = alpha);

        Ok(self)
    }

    fn flatten_onto_mut(&mut self, mask: &AlphaMask, matte: MatteColor) -> Result<&mut Self> {
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;

        let Rgb([mr, mg, mb]) = matte.to_rgb();
        self.pixels_mut()
            .zip_eq(mask.pixels())
            .for_each(|(pixel, &Luma([alpha]))| {
                let Rgba([r, g, b, _]) = *pixel;
                let weight = f32::from(alpha) / 255.0;
                *pixel = Rgba([
                    blend_channel(mr, r, weight),
                    blend_channel(mg, g, weight),
                    blend_channel(mb, b, weight),
                    u8::MAX,
                ]);
            });

        Ok(self)
    }
}

/// `lerp(matte, colour, weight)` rounded to 8 bits.
#[inline]
#[must_use]
pub fn blend_channel(matte: u8, color: u8, weight: f32) -> u8 {
    lerp(f32::from(matte), f32::from(color), weight)
        .round()
        .clamp(0.0, 255.0) as u8
}
