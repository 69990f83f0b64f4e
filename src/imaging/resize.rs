//! Resize stage: [`PixelBuffer`] → exact target dimensions.
//!
//! | Fit | Behavior |
//! |---|---|
//! | `stretch` | each axis resampled independently to the target |
//! | `contain` | uniform scale to fit, centered on a solid pad color |
//!
//! Resampling uses the runtime's filter (Lanczos3 by default) via
//! `image::imageops::resize`. The pipeline skips this stage entirely when no
//! spec is given.

use super::calculations::{calculate_contain_dimensions, centered_offset};
use super::params::{FitMethod, ResizeSpec};
use super::pixels::PixelBuffer;
use super::runtime::ResizerRuntime;
use crate::error::ConvertError;
use image::{Rgba, RgbaImage, imageops};

/// Fully transparent black.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Resize to exactly `spec.width() x spec.height()`.
///
/// `pad` fills the area `contain` leaves uncovered.
pub fn resize(
    runtime: &ResizerRuntime,
    image: PixelBuffer,
    spec: &ResizeSpec,
    pad: [u8; 4],
) -> Result<PixelBuffer, ConvertError> {
    let target = (spec.width(), spec.height());
    let source = image.dimensions();

    let output = match spec.fit() {
        FitMethod::Stretch => resample(runtime, &image, target),
        FitMethod::Contain => {
            let content_dims = calculate_contain_dimensions(source, target);
            let content = resample(runtime, &image, content_dims);
            if content_dims == target {
                content
            } else {
                let (x, y) = centered_offset(content_dims, target);
                log::debug!(
                    "contain {}x{} → {}x{} at ({x}, {y}) in {}x{}",
                    source.0,
                    source.1,
                    content_dims.0,
                    content_dims.1,
                    target.0,
                    target.1
                );
                let mut canvas = RgbaImage::from_pixel(target.0, target.1, Rgba(pad));
                imageops::replace(&mut canvas, &content, i64::from(x), i64::from(y));
                canvas
            }
        }
    };

    PixelBuffer::from_rgba(output).ok_or(ConvertError::InvalidDimensions {
        width: target.0.into(),
        height: target.1.into(),
    })
}

fn resample(runtime: &ResizerRuntime, image: &PixelBuffer, (width, height): (u32, u32)) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.as_image().clone();
    }
    imageops::resize(image.as_image(), width, height, runtime.filter())
}
