//! Owned RGBA8 pixel buffer passed between pipeline stages.

use image::{DynamicImage, RgbaImage};

/// Decoded raster: row-major interleaved RGBA, 8 bits per sample.
///
/// Backed by an [`RgbaImage`], so `data.len() == width * height * 4` holds by
/// construction. Width and height are always non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Build from raw RGBA samples. Returns `None` for zero dimensions or a
    /// length mismatch.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        RgbaImage::from_raw(width, height, data)
            .filter(|image| image.as_raw().len() == width as usize * height as usize * 4)
            .map(|image| Self { image })
    }

    pub(crate) fn from_rgba(image: RgbaImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        (width > 0 && height > 0).then_some(Self { image })
    }

    /// Convert any decoded image to RGBA8.
    pub(crate) fn from_dynamic(image: DynamicImage) -> Option<Self> {
        Self::from_rgba(image.into_rgba8())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA samples.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// RGBA samples of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub(crate) fn as_image(&self) -> &RgbaImage {
        &self.image
    }
}
