use thiserror::Error;

/// Error type for the matting pipeline
///
/// Every failure is local and synchronous. The pipeline never returns a
/// partially processed buffer alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MattingError {
    /// A parameter or the source image is outside its domain
    ///
    /// Raised for values that clamping cannot repair: non-numeric or
    /// non-finite input, malformed matte colours, missing or undecodable
    /// source images and raw buffers whose length disagrees with their
    /// dimensions.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Border sampling produced no colour samples
    ///
    /// Unreachable for any image with non-zero dimensions, but reported
    /// instead of panicking when an empty sample set reaches the estimator.
    #[error("No border samples available to estimate the background")]
    EmptyInput,

    /// Image and alpha mask dimensions do not match
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// A specialized `Result` type for matting operations.
pub type Result<T> = std::result::Result<T, MattingError>;
