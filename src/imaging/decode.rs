//! Decoder dispatch: container bytes → RGBA [`PixelBuffer`].
//!
//! One decode routine per [`SourceFormat`], chosen by an exhaustive match.
//! Dimensions come from the container header and are checked against the
//! runtime's pixel limit before the full decode allocates anything.
//!
//! Multi-frame input is out of scope: animated WebP is rejected. An APNG
//! decodes as its default still image.

use super::format::SourceFormat;
use super::pixels::PixelBuffer;
use super::runtime::DecoderRuntime;
use crate::error::ConvertError;
use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{DynamicImage, ImageDecoder};
use std::io::Cursor;

/// Decode `bytes` with the runtime's format.
pub fn decode(runtime: &DecoderRuntime, bytes: &[u8]) -> Result<PixelBuffer, ConvertError> {
    let format = runtime.format();
    let image = match format {
        SourceFormat::Png => decode_png(runtime, bytes),
        SourceFormat::Jpeg => decode_jpeg(runtime, bytes),
        SourceFormat::WebP => decode_webp(runtime, bytes),
    }?;

    let pixels = PixelBuffer::from_dynamic(image)
        .ok_or_else(|| ConvertError::decode(format, "image has zero width or height"))?;
    log::debug!(
        "decoded {format} {}x{} ({} input bytes)",
        pixels.width(),
        pixels.height(),
        bytes.len()
    );
    Ok(pixels)
}

fn decode_png(runtime: &DecoderRuntime, bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    let decoder = PngDecoder::new(Cursor::new(bytes))
        .map_err(|e| ConvertError::decode(SourceFormat::Png, e))?;
    finish(runtime, decoder)
}

fn decode_jpeg(runtime: &DecoderRuntime, bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))
        .map_err(|e| ConvertError::decode(SourceFormat::Jpeg, e))?;
    finish(runtime, decoder)
}

fn decode_webp(runtime: &DecoderRuntime, bytes: &[u8]) -> Result<DynamicImage, ConvertError> {
    let decoder = WebPDecoder::new(Cursor::new(bytes))
        .map_err(|e| ConvertError::decode(SourceFormat::WebP, e))?;
    if decoder.has_animation() {
        return Err(ConvertError::decode(
            SourceFormat::WebP,
            "animated WebP is not supported",
        ));
    }
    finish(runtime, decoder)
}

/// Check header dimensions, apply limits, run the full decode.
fn finish(
    runtime: &DecoderRuntime,
    mut decoder: impl ImageDecoder,
) -> Result<DynamicImage, ConvertError> {
    let format = runtime.format();
    let (width, height) = decoder.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::decode(
            format,
            format!("invalid header dimensions {width}x{height}"),
        ));
    }
    let pixels = u64::from(width) * u64::from(height);
    if pixels > runtime.max_pixels() {
        return Err(ConvertError::decode(
            format,
            format!(
                "{width}x{height} exceeds the {} pixel limit",
                runtime.max_pixels()
            ),
        ));
    }

    decoder
        .set_limits(runtime.limits())
        .map_err(|e| ConvertError::decode(format, e))?;
    DynamicImage::from_decoder(decoder).map_err(|e| ConvertError::decode(format, e))
}
