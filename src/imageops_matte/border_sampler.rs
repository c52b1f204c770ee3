use image::{Rgb, Rgba};
use imageproc::definitions::Image;

/// Upper bound on the number of border samples handed to the estimator.
pub const MAX_BORDER_SAMPLES: usize = 5000;

/// Edge length covered by one stride step before the stride grows.
const STEP_DIVISOR: u32 = 256;

/// Sampling stride for an image of the given size.
///
/// One sample per pixel up to 511 pixels on the longer edge, then one sample
/// every `max(W, H) / 256` pixels.
#[must_use]
pub fn border_step(width: u32, height: u32) -> u32 {
    (width.max(height) / STEP_DIVISOR).max(1)
}

/// Trait for collecting background colour candidates from the outer ring of an image.
pub trait BorderSamplerExt {
    /// Samples the top row, bottom row, left column and right column.
    ///
    /// Each edge is walked from its first pixel advancing by `step` pixels.
    /// A `step` of zero is treated as one. When more than
    /// [`MAX_BORDER_SAMPLES`] samples are produced, every k-th sample is kept
    /// with `k = ceil(count / MAX_BORDER_SAMPLES)`.
    ///
    /// Returns an empty vector only for an image with a zero dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use image::{Rgb, Rgba};
    /// use imageops_matte::{BorderSamplerExt, Image};
    ///
    /// let image: Image<Rgba<u8>> = Image::from_pixel(3, 2, Rgba([9, 8, 7, 255]));
    /// let samples = image.sample_border(1);
    /// assert_eq!(samples.len(), 3 + 3 + 2 + 2);
    /// assert!(samples.iter().all(|s| *s == Rgb([9, 8, 7])));
    /// ```
    fn sample_border(&self, step: u32) -> Vec<Rgb<u8>>;

    /// Samples the border with the stride from [`border_step`].
    fn sample_border_auto(&self) -> Vec<Rgb<u8>>;
}

impl BorderSamplerExt for Image<Rgba<u8>> {
    fn sample_border(&self, step: u32) -> Vec<Rgb<u8>> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let step = step.max(1) as usize;
        let rgb = |x: u32, y: u32| {
            let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
            Rgb([r, g, b])
        };

        let top = (0..width).step_by(step).map(|x| rgb(x, 0));
        let bottom = (0..width).step_by(step).map(|x| rgb(x, height - 1));
        let left = (0..height).step_by(step).map(|y| rgb(0, y));
        let right = (0..height).step_by(step).map(|y| rgb(width - 1, y));

        let samples: Vec<Rgb<u8>> = top.chain(bottom).chain(left).chain(right).collect();
        cap_samples(samples, MAX_BORDER_SAMPLES)
    }

    fn sample_border_auto(&self) -> Vec<Rgb<u8>> {
        let (width, height) = self.dimensions();
        self.sample_border(border_step(width, height))
    }
}

/// Keeps every k-th sample so that at most `cap` remain.
fn cap_samples(samples: Vec<Rgb<u8>>, cap: usize) -> Vec<Rgb<u8>> {
    if samples.len() <= cap {
        return samples;
    }
    let keep_every = samples.len().div_ceil(cap);
    samples.into_iter().step_by(keep_every).collect()
}
