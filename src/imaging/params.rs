//! Parameter types for the resize stage.
//!
//! - [`FitMethod`] — how source content maps into the target box.
//! - [`ResizeSpec`] — validated target dimensions plus fit method.
//! - [`ResampleFilter`] — configurable resampling kernel.

use crate::error::ConvertError;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// WebP stores dimensions in 14 bits.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Fit policy for an exact target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    /// Uniform scale to fit inside the box, remainder padded.
    #[default]
    Contain,
    /// Independent scale per axis, no padding.
    Stretch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown fit method '{0}' (expected 'contain' or 'stretch')")]
pub struct ParseFitMethodError(pub String);

impl FromStr for FitMethod {
    type Err = ParseFitMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contain" => Ok(FitMethod::Contain),
            "stretch" => Ok(FitMethod::Stretch),
            other => Err(ParseFitMethodError(other.to_string())),
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitMethod::Contain => "contain",
            FitMethod::Stretch => "stretch",
        })
    }
}

/// Validated resize request: both dimensions positive and within range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSpec {
    width: u32,
    height: u32,
    fit: FitMethod,
}

impl ResizeSpec {
    pub fn new(width: u32, height: u32, fit: FitMethod) -> Result<Self, ConvertError> {
        Self::with_limits(width, height, fit, WEBP_MAX_DIMENSION, u64::MAX)
    }

    /// Like [`new`](Self::new) with caller-chosen bounds: `max_dimension`
    /// per axis and `max_pixels` for `width * height`.
    pub fn with_limits(
        width: u32,
        height: u32,
        fit: FitMethod,
        max_dimension: u32,
        max_pixels: u64,
    ) -> Result<Self, ConvertError> {
        let in_range = |v: u32| v > 0 && v <= max_dimension;
        let area = u64::from(width) * u64::from(height);
        if !in_range(width) || !in_range(height) || area > max_pixels {
            return Err(ConvertError::InvalidDimensions {
                width: width.into(),
                height: height.into(),
            });
        }
        Ok(Self { width, height, fit })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fit(&self) -> FitMethod {
        self.fit
    }
}

/// Resampling kernel.
///
/// `Nearest` parses so config errors can name it, but is refused when the
/// resizer runtime initializes: point sampling is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    /// The `image` crate filter, or `None` for point sampling.
    pub fn filter_type(self) -> Option<FilterType> {
        match self {
            ResampleFilter::Nearest => None,
            ResampleFilter::Triangle => Some(FilterType::Triangle),
            ResampleFilter::CatmullRom => Some(FilterType::CatmullRom),
            ResampleFilter::Gaussian => Some(FilterType::Gaussian),
            ResampleFilter::Lanczos3 => Some(FilterType::Lanczos3),
        }
    }
}
