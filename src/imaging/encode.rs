//! Encode stage: [`PixelBuffer`] → WebP bytes.
//!
//! Output is always lossless WebP (VP8L) from the `image` crate's pure-Rust
//! encoder. There are no tunable quality parameters.

use super::pixels::PixelBuffer;
use super::runtime::EncoderRuntime;
use crate::error::ConvertError;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

pub fn encode(runtime: &EncoderRuntime, image: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    let (width, height) = image.dimensions();
    let max = runtime.max_dimension();
    if width > max || height > max {
        return Err(ConvertError::Encode(format!(
            "{width}x{height} exceeds the {max} pixel WebP dimension limit"
        )));
    }

    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| ConvertError::Encode(e.to_string()))?;
    log::debug!("encoded {width}x{height} WebP ({} bytes)", out.len());
    Ok(out)
}
