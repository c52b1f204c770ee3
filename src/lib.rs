//! Border-colour background removal for product-style photographs.
//!
//! The pipeline assumes the subject sits on a roughly uniform backdrop that
//! touches the image border. It downscales the image, estimates the
//! backdrop colour from the border, derives an alpha mask from each pixel's
//! colour distance to that estimate, cleans the mask with a few
//! blur-and-rethreshold rounds and finally replaces the alpha channel or
//! flattens the result onto a matte colour.
//!
//! Every stage is also available on its own through an extension trait.
//!
//! ```
//! use image::Rgba;
//! use imageops_matte::{remove_background, Image, MattingParams};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let image: Image<Rgba<u8>> = Image::from_pixel(32, 32, Rgba([240, 240, 240, 255]));
//! let params = MattingParams::from_pairs([("tol", "40"), ("matte", "#ffffff")])?;
//!
//! let outcome = remove_background(image, &params)?;
//! assert!(outcome.image.pixels().all(|p| p[3] == 255));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod error;
mod imageops_matte;
mod utils;

#[cfg(test)]
mod test_utils;

use image::Luma;

pub use error::{MattingError, Result};
pub use imageops_matte::background::{estimate_background, EstimateBackgroundExt};
pub use imageops_matte::border_sampler::{border_step, BorderSamplerExt, MAX_BORDER_SAMPLES};
pub use imageops_matte::box_filter::BoxFilter;
pub use imageops_matte::compositor::{blend_channel, CompositeExt};
pub use imageops_matte::despeckle::{
    DespeckleExt, DESPECKLE_RADIUS, RETHRESHOLD_HIGH, RETHRESHOLD_LOW,
};
pub use imageops_matte::distance_alpha::{
    alpha_for_distance, color_distance_squared, AlphaFromDistanceExt,
};
pub use imageops_matte::inter_area::{fit_dimensions, resize_area, FitWithinExt};
pub use imageops_matte::params::{
    MatteColor, MattingParams, MattingParamsBuilder, Thresholds, DEFAULT_DESPECKLE_ROUNDS,
    DEFAULT_FEATHER, DEFAULT_HARD, DEFAULT_MAX_DIMENSION, DEFAULT_TOLERANCE, DESPECKLE_RANGE,
    FEATHER_RANGE, HARD_RANGE, MAX_DIMENSION_RANGE, TOLERANCE_RANGE,
};
pub use imageops_matte::pipeline::{
    remove_background, remove_background_dynamic, remove_background_from_memory,
    remove_background_raw, MattingOutcome,
};
pub use imageops_matte::summed_area_table::SummedAreaTable;
pub use utils::smoothstep;

pub use imageproc::definitions::Image;

/// Single-channel 8-bit opacity mask, one value per pixel.
pub type AlphaMask = Image<Luma<u8>>;
