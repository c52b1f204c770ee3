//! Internal utility functions for imageops-matte.
//!
//! This module contains common functionality used across the matting stages.

use crate::error::{MattingError, Result};

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Hermite ease between two edges.
///
/// Returns 0 at or below `edge0`, 1 at or above `edge1` and
/// `t²(3 - 2t)` in between, where `t` is the normalized position of `x`.
///
/// # Arguments
///
/// * `edge0` - Lower edge
/// * `edge1` - Upper edge, must be greater than `edge0`
/// * `x` - Value to map
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if x <= edge0 {
        return 0.0;
    }
    if x >= edge1 {
        return 1.0;
    }
    let t = (x - edge0) / (edge1 - edge0);
    t * t * (3.0 - 2.0 * t)
}

/// Maps a normalized value in [0, 1] to an 8-bit channel by rounding.
#[inline]
pub fn quantize_unit(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
/// * `context` - A description of the context for error messages
pub fn validate_non_empty_image(width: u32, height: u32, context: &str) -> Result<()> {
    if width == 0 || height == 0 {
        Err(MattingError::InvalidParameter(format!(
            "{context}: image dimensions must be non-zero, got {width}x{height}"
        )))
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
pub fn validate_matching_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MattingError::DimensionMismatch { expected, actual })
    }
}
