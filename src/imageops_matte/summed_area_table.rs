use image::Luma;
use imageproc::definitions::Image;

/// Summed-area table over an 8-bit single-channel image.
///
/// Each entry holds the sum of all source values from the origin (0, 0) to
/// that coordinate inclusive, so any rectangle sum costs four lookups.
/// The backing storage can be rebuilt from another image of the same size
/// without reallocating.
#[derive(Debug, Clone, Default)]
pub struct SummedAreaTable {
    data: Vec<u64>,
    width: u32,
    height: u32,
}

impl SummedAreaTable {
    /// Creates a summed-area table from a mask.
    #[must_use]
    pub fn from_luma(image: &Image<Luma<u8>>) -> Self {
        let mut table = Self::default();
        table.rebuild(image);
        table
    }

    /// Recomputes the table from `image`, reusing the existing allocation.
    pub fn rebuild(&mut self, image: &Image<Luma<u8>>) {
        let (width, height) = image.dimensions();
        let row_len = width as usize;
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(row_len * height as usize, 0);

        if row_len == 0 {
            return;
        }

        // sat(x, y) = row_sum(0..=x, y) + sat(x, y - 1)
        for (y, source_row) in image.chunks_exact(row_len).enumerate() {
            let mut row_sum = 0u64;
            for (x, &value) in source_row.iter().enumerate() {
                row_sum += u64::from(value);
                let above = if y > 0 { self.data[(y - 1) * row_len + x] } else { 0 };
                self.data[y * row_len + x] = row_sum + above;
            }
        }
    }

    /// Returns the table value at (x, y), or 0 outside the image.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> u64 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            0
        } else {
            self.data[y as usize * self.width as usize + x as usize]
        }
    }

    /// Sum of the source values inside the inclusive rectangle.
    ///
    /// The rectangle is clipped to the image first; an empty intersection sums to 0.
    ///
    /// Sum = sat(x2, y2) - sat(x1-1, y2) - sat(x2, y1-1) + sat(x1-1, y1-1)
    #[must_use]
    pub fn rectangle_sum(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> u64 {
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(i64::from(self.width) - 1);
        let y2 = y2.min(i64::from(self.height) - 1);

        if x1 > x2 || y1 > y2 {
            return 0;
        }

        let bottom_right = self.get(x2, y2);
        let top_right = self.get(x2, y1 - 1);
        let bottom_left = self.get(x1 - 1, y2);
        let top_left = self.get(x1 - 1, y1 - 1);

        // add before subtracting so the unsigned arithmetic never goes negative
        (bottom_right + top_left) - (top_right + bottom_left)
    }

    /// Mean over the `(2 * x_radius + 1) x (2 * y_radius + 1)` window centred
    /// on (x, y), counting only in-bounds pixels.
    #[must_use]
    pub fn window_mean(&self, x: u32, y: u32, x_radius: u32, y_radius: u32) -> f32 {
        let x1 = i64::from(x) - i64::from(x_radius);
        let y1 = i64::from(y) - i64::from(y_radius);
        let x2 = (i64::from(x) + i64::from(x_radius)).min(i64::from(self.width) - 1);
        let y2 = (i64::from(y) + i64::from(y_radius)).min(i64::from(self.height) - 1);
        let (x1, y1) = (x1.max(0), y1.max(0));

        let area = ((x2 - x1 + 1) * (y2 - y1 + 1)) as f32;
        self.rectangle_sum(x1, y1, x2, y2) as f32 / area
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}
