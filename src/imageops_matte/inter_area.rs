use image::{ImageBuffer, Pixel, Primitive};
use imageproc::definitions::{Clamp, Image};
use tracing::debug;

/// Contribution of one source index to one destination index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct InterpolationWeight {
    source_index: u32,
    weight: f32,
}

/// Target size that fits `(width, height)` within `max_dimension` on its longer edge.
///
/// The aspect ratio is preserved, the longer edge becomes exactly
/// `max_dimension` and the shorter edge is rounded, never below 1.
/// Dimensions already within bounds are returned unchanged.
///
/// # Examples
///
/// ```
/// use imageops_matte::fit_dimensions;
///
/// assert_eq!(fit_dimensions(4000, 3000, 1024), (1024, 768));
/// assert_eq!(fit_dimensions(800, 600, 1024), (800, 600));
/// assert_eq!(fit_dimensions(10_000, 3, 1024), (1024, 1));
/// ```
#[must_use]
pub fn fit_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_dimension || max_dimension == 0 {
        return (width, height);
    }

    let scale_side = |side: u32| {
        let scaled = (u64::from(side) * u64::from(max_dimension) + u64::from(longer) / 2)
            / u64::from(longer);
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_dimension, scale_side(height))
    } else {
        (scale_side(width), max_dimension)
    }
}

/// Trait for bounding an image's size before matting.
pub trait FitWithinExt {
    /// Downscales so the longer edge does not exceed `max_dimension`.
    ///
    /// Uses area averaging, which is alias-free for any reduction factor.
    /// Images already within bounds are returned as they are.
    #[must_use]
    fn fit_within(self, max_dimension: u32) -> Self;
}

impl<P> FitWithinExt for Image<P>
where
    P: Pixel,
    P::Subpixel: Clamp<f32> + Into<f32> + Primitive,
{
    fn fit_within(self, max_dimension: u32) -> Self {
        let (width, height) = self.dimensions();
        let (new_width, new_height) = fit_dimensions(width, height, max_dimension);
        if (new_width, new_height) == (width, height) {
            return self;
        }

        debug!(
            width,
            height,
            new_width,
            new_height,
            "downscaling source image"
        );
        resize_area(&self, new_width, new_height)
    }
}

/// Area-averaging resize for downscaling.
///
/// Every destination pixel is the overlap-weighted mean of the source
/// pixels its footprint covers.
#[must_use]
pub fn resize_area<P>(source: &Image<P>, new_width: u32, new_height: u32) -> Image<P>
where
    P: Pixel,
    P::Subpixel: Clamp<f32> + Into<f32> + Primitive,
{
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 || new_width == 0 || new_height == 0 {
        return ImageBuffer::new(new_width, new_height);
    }

    let x_weights = compute_interpolation_weights(width, new_width);
    let y_weights = compute_interpolation_weights(height, new_height);
    let channels = usize::from(P::CHANNEL_COUNT);
    let mut sum = vec![0.0f32; channels];
    let mut output_channels = vec![P::Subpixel::DEFAULT_MIN_VALUE; channels];

    let mut output: Image<P> = ImageBuffer::new(new_width, new_height);
    for (dy, row_weights) in y_weights.iter().enumerate() {
        for (dx, column_weights) in x_weights.iter().enumerate() {
            sum.fill(0.0);

            for y_entry in row_weights {
                for x_entry in column_weights {
                    let weight = y_entry.weight * x_entry.weight;
                    let pixel = source.get_pixel(x_entry.source_index, y_entry.source_index);
                    for (acc, &value) in sum.iter_mut().zip(pixel.channels()) {
                        let value: f32 = value.into();
                        *acc += value * weight;
                    }
                }
            }

            for (out, &acc) in output_channels.iter_mut().zip(&sum) {
                *out = P::Subpixel::clamp(acc.round());
            }
            output.put_pixel(dx as u32, dy as u32, *P::from_slice(&output_channels));
        }
    }

    output
}

/// Per destination index, the source indices its footprint overlaps and
/// their normalized weights.
fn compute_interpolation_weights(src_size: u32, dst_size: u32) -> Vec<Vec<InterpolationWeight>> {
    let scale = f64::from(src_size) / f64::from(dst_size);

    (0..dst_size)
        .map(|dx| {
            let start = f64::from(dx) * scale;
            let end = (start + scale).min(f64::from(src_size));
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_size);

            let mut entries: Vec<InterpolationWeight> = (first..last)
                .filter_map(|sx| {
                    let overlap = (f64::from(sx + 1).min(end) - f64::from(sx).max(start)) as f32;
                    (overlap > 1e-6).then_some(InterpolationWeight {
                        source_index: sx,
                        weight: overlap,
                    })
                })
                .collect();

            let total: f32 = entries.iter().map(|entry| entry.weight).sum();
            entries.iter_mut().for_each(|entry| entry.weight /= total);
            entries
        })
        .collect()
}
