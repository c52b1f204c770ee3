use image::{ImageBuffer, Luma};
use imageproc::definitions::Image;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::imageops_matte::summed_area_table::SummedAreaTable;

/// Box filter backed by a summed-area table.
///
/// Windows are clipped at the image edges and averaged over the pixels that
/// remain, so edge rows are neither wrapped nor darkened by zero padding.
/// Cost per pixel is constant regardless of the radius.
pub trait BoxFilter {
    /// Output image type
    type Output;

    /// Applies a `(2 * x_radius + 1) x (2 * y_radius + 1)` mean filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use image::{ImageBuffer, Luma};
    /// use imageops_matte::{BoxFilter, Image};
    ///
    /// let mask: Image<Luma<u8>> = ImageBuffer::from_raw(3, 1, vec![0, 90, 0]).unwrap();
    /// let blurred = mask.box_filter(1, 0);
    /// assert_eq!(blurred.as_raw(), &vec![45.0, 30.0, 45.0]);
    /// ```
    fn box_filter(&self, x_radius: u32, y_radius: u32) -> Self::Output;

    /// Applies a square box filter with the given radius.
    fn box_filter_square(&self, radius: u32) -> Self::Output {
        self.box_filter(radius, radius)
    }
}

impl BoxFilter for Image<Luma<u8>> {
    type Output = Image<Luma<f32>>;

    fn box_filter(&self, x_radius: u32, y_radius: u32) -> Self::Output {
        let sat = SummedAreaTable::from_luma(self);
        let mut output: Image<Luma<f32>> = ImageBuffer::new(self.width(), self.height());
        let values: &mut [f32] = &mut output;
        map_windows(&sat, values, x_radius, y_radius, |mean| mean);
        output
    }
}

/// Writes `f(window mean)` for every pixel of `sat` into `output`.
///
/// `output` must have the dimensions the table was built from.
pub(crate) fn map_windows<T, F>(
    sat: &SummedAreaTable,
    output: &mut [T],
    x_radius: u32,
    y_radius: u32,
    f: F,
) where
    T: Send,
    F: Fn(f32) -> T + Sync,
{
    let row_len = sat.width() as usize;
    if row_len == 0 {
        return;
    }

    let fill_row = |(y, row): (usize, &mut [T])| {
        for (x, value) in row.iter_mut().enumerate() {
            *value = f(sat.window_mean(x as u32, y as u32, x_radius, y_radius));
        }
    };

    #[cfg(feature = "rayon")]
    output
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(fill_row);

    #[cfg(not(feature = "rayon"))]
    output.chunks_mut(row_len).enumerate().for_each(fill_row);
}
