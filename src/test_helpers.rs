//! Shared test utilities: in-memory fixture images in every source format.
//!
//! Fixtures are encoded on the fly with the `image` crate's own encoders, so
//! tests need no files on disk.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let red = solid(4, 4, RED);
//! let url = data_url(SourceFormat::Png, &encode_png(&red));
//! ```

use crate::imaging::format::SourceFormat;
use crate::imaging::transcode::{self, DataUrl};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};

pub const RED: [u8; 4] = [255, 0, 0, 255];

// =========================================================================
// Fixture images
// =========================================================================

pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

// =========================================================================
// Encoders
// =========================================================================

pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .unwrap();
    out
}

/// JPEG has no alpha channel; alpha is dropped.
pub fn encode_jpeg(img: &RgbaImage) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).into_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 95)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .unwrap();
    out
}

pub fn encode_webp(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .unwrap();
    out
}

pub fn encode(format: SourceFormat, img: &RgbaImage) -> Vec<u8> {
    match format {
        SourceFormat::Png => encode_png(img),
        SourceFormat::Jpeg => encode_jpeg(img),
        SourceFormat::WebP => encode_webp(img),
    }
}

// =========================================================================
// Data URLs
// =========================================================================

pub fn data_url(format: SourceFormat, bytes: &[u8]) -> DataUrl {
    transcode::encode(bytes, format.mime_type())
}

/// Decode pipeline output with an independent WebP decode.
pub fn decode_output(url: &DataUrl) -> RgbaImage {
    assert_eq!(url.media_type(), Some("image/webp"), "output must be WebP");
    let bytes = transcode::decode(url).unwrap();
    image::load_from_memory_with_format(&bytes, ImageFormat::WebP)
        .unwrap()
        .into_rgba8()
}

/// Assert a pixel is close to `expected` on every channel.
pub fn assert_pixel_near(actual: [u8; 4], expected: [u8; 4], tolerance: u8) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            a.abs_diff(e) <= tolerance,
            "pixel {actual:?} not within {tolerance} of {expected:?}"
        );
    }
}
