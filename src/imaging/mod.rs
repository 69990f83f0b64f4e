//! Image processing — pure Rust, built on the `image` crate.
//!
//! | Stage | Crate / function |
//! |---|---|
//! | **Transcode** | `base64` (standard alphabet, lenient padding) |
//! | **Sniff** | declared `data:` media type, or PNG/JPEG/RIFF-WEBP signatures |
//! | **Decode** | `image::codecs::{png, jpeg, webp}` decoders |
//! | **Resize** | `image::imageops::resize`, Lanczos3 by default |
//! | **Encode** | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit geometry (unit testable)
//! - **Parameters**: Fit method, resize spec, resampling filter
//! - **Runtimes**: Once-per-process codec handles shared by every call
//! - **Stages**: `transcode`, `sniff`, `decode`, `resize`, `encode`

mod calculations;
pub mod decode;
pub mod encode;
pub mod format;
mod params;
pub mod pixels;
pub mod resize;
pub mod runtime;
pub mod sniff;
pub mod transcode;

pub use format::{OutputFormat, SourceFormat};
pub use params::{FitMethod, ParseFitMethodError, ResampleFilter, ResizeSpec, WEBP_MAX_DIMENSION};
pub use pixels::PixelBuffer;
pub use runtime::{RuntimeKind, RuntimeSettings, Runtimes};
pub use sniff::SniffMode;
pub use transcode::DataUrl;
