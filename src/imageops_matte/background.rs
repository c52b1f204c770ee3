use image::{Rgb, Rgba};
use imageproc::definitions::Image;

use crate::error::{MattingError, Result};
use crate::imageops_matte::border_sampler::BorderSamplerExt;

/// Reduces border samples to a single background colour.
///
/// Each channel is the median of that channel across all samples, taken
/// independently. For an even number of samples the upper of the two middle
/// values is used, so the result is always a value present in the input.
/// A subject touching the border only shifts the estimate once it covers
/// half of the sampled ring.
///
/// # Errors
///
/// * `MattingError::EmptyInput` - `samples` is empty
///
/// # Examples
///
/// ```
/// use image::Rgb;
/// use imageops_matte::estimate_background;
///
/// let samples = [Rgb([250, 250, 250]), Rgb([255, 0, 0]), Rgb([248, 252, 251])];
/// assert_eq!(estimate_background(&samples).unwrap(), Rgb([250, 250, 250]));
/// ```
pub fn estimate_background(samples: &[Rgb<u8>]) -> Result<Rgb<u8>> {
    if samples.is_empty() {
        return Err(MattingError::EmptyInput);
    }

    let mut channel = Vec::with_capacity(samples.len());
    let mut median_of = |index: usize| {
        channel.clear();
        channel.extend(samples.iter().map(|sample| sample[index]));
        let middle = channel.len() / 2;
        *channel.select_nth_unstable(middle).1
    };

    Ok(Rgb([median_of(0), median_of(1), median_of(2)]))
}

/// Trait for estimating the background colour of an image from its border.
pub trait EstimateBackgroundExt {
    /// Samples the border with the size-derived stride and takes the
    /// per-channel median.
    ///
    /// # Errors
    ///
    /// * `MattingError::EmptyInput` - the image has a zero dimension
    fn estimate_background(&self) -> Result<Rgb<u8>>;
}

impl EstimateBackgroundExt for Image<Rgba<u8>> {
    fn estimate_background(&self) -> Result<Rgb<u8>> {
        estimate_background(&self.sample_border_auto())
    }
}
