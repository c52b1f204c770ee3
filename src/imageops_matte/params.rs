use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use image::Rgb;

use crate::error::{MattingError, Result};
use crate::utils::lerp;

/// Accepted range of the output's longer edge in pixels.
pub const MAX_DIMENSION_RANGE: RangeInclusive<u32> = 128..=4096;
/// Accepted range of the lower distance threshold.
pub const TOLERANCE_RANGE: RangeInclusive<f32> = 1.0..=200.0;
/// Accepted range of the upper distance threshold before it is forced above `tol`.
pub const HARD_RANGE: RangeInclusive<f32> = 5.0..=400.0;
/// Accepted range of the feather multiplier.
pub const FEATHER_RANGE: RangeInclusive<f32> = 0.5..=10.0;
/// Accepted range of the despeckle round count.
pub const DESPECKLE_RANGE: RangeInclusive<u8> = 0..=3;

pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
pub const DEFAULT_TOLERANCE: f32 = 35.0;
pub const DEFAULT_HARD: f32 = 55.0;
pub const DEFAULT_FEATHER: f32 = 2.5;
pub const DEFAULT_DESPECKLE_ROUNDS: u8 = 1;

/// Solid colour used to flatten transparency.
///
/// Parsed from exactly six hexadecimal digits, with or without a leading `#`.
///
/// # Examples
///
/// ```
/// use imageops_matte::MatteColor;
///
/// let matte: MatteColor = "#ff8800".parse().unwrap();
/// assert_eq!(matte.to_rgb().0, [255, 136, 0]);
/// assert_eq!(matte.to_string(), "#ff8800");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct MatteColor(Rgb<u8>);

impl MatteColor {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Rgb([red, green, blue]))
    }

    #[must_use]
    pub const fn to_rgb(self) -> Rgb<u8> {
        self.0
    }
}

impl From<Rgb<u8>> for MatteColor {
    fn from(color: Rgb<u8>) -> Self {
        Self(color)
    }
}

impl FromStr for MatteColor {
    type Err = MattingError;

    fn from_str(value: &str) -> Result<Self> {
        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MattingError::InvalidParameter(format!(
                "matte colour must be six hex digits, got {value:?}"
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|e| {
                MattingError::InvalidParameter(format!("matte colour {value:?}: {e}"))
            })
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for MatteColor {
    type Error = MattingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MatteColor> for String {
    fn from(color: MatteColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for MatteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgb([r, g, b]) = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Distance thresholds in squared RGB space.
///
/// Derived once per request from a [`MattingParams`]. `soft2` is the
/// midpoint of `tol²` and `hard²` scaled by the feather multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Squared distances at or below this value are background.
    pub tol2: f32,
    /// Squared distances at or above this value are fully opaque.
    pub soft2: f32,
}

impl Thresholds {
    #[must_use]
    pub fn new(tol: f32, hard: f32, feather: f32) -> Self {
        let tol2 = tol * tol;
        let hard2 = hard * hard;
        Self {
            tol2,
            soft2: lerp(tol2, hard2, 0.5) * feather,
        }
    }
}

/// Validated configuration of one matting request.
///
/// Every value is clamped into its documented range and `hard` is kept at
/// least one above `tol`. Instances are immutable; build a new one per
/// request with [`MattingParams::builder`] or [`MattingParams::from_pairs`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "MattingParamsBuilder")
)]
pub struct MattingParams {
    max_dimension: u32,
    tol: f32,
    hard: f32,
    feather: f32,
    despeckle_rounds: u8,
    matte: Option<MatteColor>,
}

impl Default for MattingParams {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            tol: DEFAULT_TOLERANCE,
            hard: DEFAULT_HARD,
            feather: DEFAULT_FEATHER,
            despeckle_rounds: DEFAULT_DESPECKLE_ROUNDS,
            matte: None,
        }
    }
}

impl MattingParams {
    #[must_use]
    pub fn builder() -> MattingParamsBuilder {
        MattingParamsBuilder::default()
    }

    /// Builds parameters from string key/value pairs such as a parsed query string.
    ///
    /// Recognised keys are `max` (`max_dim`, `maxDim`), `tol`, `hard`,
    /// `feather`, `despeckle` and `matte` (`bg`). Unknown keys are ignored
    /// and empty values fall back to the default.
    ///
    /// # Errors
    ///
    /// * `MattingError::InvalidParameter` - a value is not a finite number,
    ///   `despeckle` is not an integer or `matte` is not a hex colour
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_matte::MattingParams;
    ///
    /// let params = MattingParams::from_pairs([("tol", "500"), ("hard", "10")]).unwrap();
    /// assert_eq!(params.tol(), 200.0);
    /// assert_eq!(params.hard(), 201.0);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = Self::builder();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "max" | "max_dim" | "maxDim" => {
                    let max = parse_number(key, value)?;
                    let (lo, hi) = (*MAX_DIMENSION_RANGE.start(), *MAX_DIMENSION_RANGE.end());
                    let max = max.round().clamp(f64::from(lo), f64::from(hi));
                    builder = builder.max_dimension(max as u32);
                }
                "tol" => builder = builder.tol(parse_real(key, value)?),
                "hard" => builder = builder.hard(parse_real(key, value)?),
                "feather" => builder = builder.feather(parse_real(key, value)?),
                "despeckle" => {
                    let rounds: i64 = value.parse().map_err(|_| {
                        MattingError::InvalidParameter(format!(
                            "despeckle: expected an integer, got {value:?}"
                        ))
                    })?;
                    let (lo, hi) = (*DESPECKLE_RANGE.start(), *DESPECKLE_RANGE.end());
                    let rounds = rounds.clamp(i64::from(lo), i64::from(hi));
                    builder = builder.despeckle_rounds(rounds as u8);
                }
                "matte" | "bg" => builder = builder.matte(value.parse::<MatteColor>()?),
                _ => {}
            }
        }

        builder.build()
    }

    #[must_use]
    pub const fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    #[must_use]
    pub const fn tol(&self) -> f32 {
        self.tol
    }

    #[must_use]
    pub const fn hard(&self) -> f32 {
        self.hard
    }

    #[must_use]
    pub const fn feather(&self) -> f32 {
        self.feather
    }

    #[must_use]
    pub const fn despeckle_rounds(&self) -> u8 {
        self.despeckle_rounds
    }

    #[must_use]
    pub const fn matte(&self) -> Option<MatteColor> {
        self.matte
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.tol, self.hard, self.feather)
    }
}

/// Builder for [`MattingParams`]. Unset values take their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct MattingParamsBuilder {
    max_dimension: Option<u32>,
    tol: Option<f32>,
    hard: Option<f32>,
    feather: Option<f32>,
    despeckle_rounds: Option<u8>,
    matte: Option<MatteColor>,
}

impl MattingParamsBuilder {
    #[must_use]
    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(max_dimension);
        self
    }

    #[must_use]
    pub fn tol(mut self, tol: f32) -> Self {
        self.tol = Some(tol);
        self
    }

    #[must_use]
    pub fn hard(mut self, hard: f32) -> Self {
        self.hard = Some(hard);
        self
    }

    #[must_use]
    pub fn feather(mut self, feather: f32) -> Self {
        self.feather = Some(feather);
        self
    }

    #[must_use]
    pub fn despeckle_rounds(mut self, rounds: u8) -> Self {
        self.despeckle_rounds = Some(rounds);
        self
    }

    #[must_use]
    pub fn matte(mut self, matte: MatteColor) -> Self {
        self.matte = Some(matte);
        self
    }

    /// Clamps every value into range and produces the parameter set.
    ///
    /// # Errors
    ///
    /// * `MattingError::InvalidParameter` - `tol`, `hard` or `feather` is NaN or infinite
    pub fn build(self) -> Result<MattingParams> {
        let tol = self.tol.unwrap_or(DEFAULT_TOLERANCE);
        let tol = clamp_finite("tol", tol, &TOLERANCE_RANGE)?;
        let hard = self.hard.unwrap_or(DEFAULT_HARD);
        let hard = clamp_finite("hard", hard, &HARD_RANGE)?.max(tol + 1.0);
        let feather = self.feather.unwrap_or(DEFAULT_FEATHER);
        let feather = clamp_finite("feather", feather, &FEATHER_RANGE)?;

        let max_dimension = self
            .max_dimension
            .unwrap_or(DEFAULT_MAX_DIMENSION)
            .clamp(*MAX_DIMENSION_RANGE.start(), *MAX_DIMENSION_RANGE.end());
        let despeckle_rounds = self
            .despeckle_rounds
            .unwrap_or(DEFAULT_DESPECKLE_ROUNDS)
            .clamp(*DESPECKLE_RANGE.start(), *DESPECKLE_RANGE.end());

        Ok(MattingParams {
            max_dimension,
            tol,
            hard,
            feather,
            despeckle_rounds,
            matte: self.matte,
        })
    }
}

impl TryFrom<MattingParamsBuilder> for MattingParams {
    type Error = MattingError;

    fn try_from(builder: MattingParamsBuilder) -> Result<Self> {
        builder.build()
    }
}

fn clamp_finite(name: &str, value: f32, range: &RangeInclusive<f32>) -> Result<f32> {
    if !value.is_finite() {
        return Err(MattingError::InvalidParameter(format!(
            "{name}: expected a finite number, got {value}"
        )));
    }
    Ok(value.clamp(*range.start(), *range.end()))
}

/// Parses a finite number saturated to the `f32` range.
fn parse_real(key: &str, value: &str) -> Result<f32> {
    let value = parse_number(key, value)?;
    Ok(value.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32)
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            MattingError::InvalidParameter(format!("{key}: expected a number, got {value:?}"))
        })
}
