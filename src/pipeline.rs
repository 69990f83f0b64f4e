//! Conversion pipeline: textual image in, `data:image/webp` out.
//!
//! ```text
//! DataUrl ─ transcode ─▶ bytes ─ decode(format) ─▶ RGBA ─ [resize] ─▶ RGBA ─ encode ─▶ WebP ─ transcode ─▶ DataUrl
//!    └──── sniff ──────────────────┘
//! ```
//!
//! Every stage error aborts the call; there is no partial output and no
//! retry. Codec runtimes come from a [`Runtimes`] borrowed for the lifetime
//! of the [`Pipeline`], so one set of handles serves every call.
//!
//! With [`SniffMode::Declared`] the declared media type is checked before
//! the payload is decoded, so an unsupported declaration fails without any
//! decoding work.

use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::imaging::{
    DataUrl, FitMethod, OutputFormat, ResizeSpec, Runtimes, SniffMode, SourceFormat,
    WEBP_MAX_DIMENSION, decode, encode, resize, sniff, transcode,
};

/// Per-call behavior that is not part of a codec runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub sniffing: SniffMode,
    /// Fit used when dimensions are given without one.
    pub default_fit: FitMethod,
    /// RGBA fill around `contain` content.
    pub pad_color: [u8; 4],
    /// Cap on the decoded payload size in bytes.
    pub max_input_bytes: u64,
    /// Cap on the requested target width/height.
    pub max_target_dimension: u32,
    /// Cap on the requested target `width * height`.
    pub max_target_pixels: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            sniffing: config.sniffing.mode,
            default_fit: config.resize.default_fit,
            pad_color: config.resize.pad_color,
            max_input_bytes: config.limits.max_input_bytes,
            max_target_dimension: config.limits.max_target_dimension.min(WEBP_MAX_DIMENSION),
            max_target_pixels: config.limits.max_target_pixels,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub source_format: SourceFormat,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ConvertedImage {
    /// `data:image/webp;base64,...` form of the output.
    pub fn to_data_url(&self) -> DataUrl {
        transcode::encode(&self.bytes, self.format.mime_type())
    }
}

/// Decode → resize → encode, sharing one set of codec runtimes.
#[derive(Debug, Clone)]
pub struct Pipeline<'r> {
    runtimes: &'r Runtimes,
    options: PipelineOptions,
}

impl<'r> Pipeline<'r> {
    pub fn new(runtimes: &'r Runtimes, options: PipelineOptions) -> Self {
        Self { runtimes, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn runtimes(&self) -> &'r Runtimes {
        self.runtimes
    }

    /// Build the resize spec for a request.
    ///
    /// Resizing happens only when both dimensions are present; `fit` falls
    /// back to the configured default.
    pub fn resize_spec(
        &self,
        width: Option<u32>,
        height: Option<u32>,
        fit: Option<FitMethod>,
    ) -> Result<Option<ResizeSpec>, ConvertError> {
        match (width, height) {
            (Some(width), Some(height)) => ResizeSpec::with_limits(
                width,
                height,
                fit.unwrap_or(self.options.default_fit),
                self.options.max_target_dimension,
                self.options.max_target_pixels,
            )
            .map(Some),
            (None, None) => Ok(None),
            (width, height) => {
                log::debug!("skipping resize: only one of width={width:?} height={height:?} given");
                Ok(None)
            }
        }
    }

    /// Run the full pipeline and return the encoded output with its metadata.
    pub fn run(
        &self,
        text: &DataUrl,
        resize_spec: Option<&ResizeSpec>,
    ) -> Result<ConvertedImage, ConvertError> {
        let (format, bytes) = match self.options.sniffing {
            SniffMode::Declared => {
                let format = sniff::classify(text)?;
                (format, transcode::decode_with_limit(text, self.options.max_input_bytes)?)
            }
            SniffMode::Content => {
                let bytes = transcode::decode_with_limit(text, self.options.max_input_bytes)?;
                (sniff::resolve(SniffMode::Content, text, &bytes)?, bytes)
            }
        };
        log::debug!("classified input as {format} ({} bytes)", bytes.len());

        let pixels = decode::decode(self.runtimes.decoder(format)?, &bytes)?;
        drop(bytes);

        let pixels = match resize_spec {
            Some(spec) => resize::resize(
                self.runtimes.resizer()?,
                pixels,
                spec,
                self.options.pad_color,
            )?,
            None => pixels,
        };

        let out = encode::encode(self.runtimes.encoder()?, &pixels)?;
        Ok(ConvertedImage {
            source_format: format,
            format: OutputFormat::WebP,
            width: pixels.width(),
            height: pixels.height(),
            bytes: out,
        })
    }

    /// Convert a textual image, optionally resizing to `width x height`.
    pub fn convert(
        &self,
        text: &DataUrl,
        width: Option<u32>,
        height: Option<u32>,
        fit: Option<FitMethod>,
    ) -> Result<DataUrl, ConvertError> {
        let spec = self.resize_spec(width, height, fit)?;
        self.run(text, spec.as_ref()).map(|image| image.to_data_url())
    }
}

/// Convert with the process-wide runtimes and default options.
pub fn convert(
    text: &DataUrl,
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<FitMethod>,
) -> Result<DataUrl, ConvertError> {
    Pipeline::new(Runtimes::global(), PipelineOptions::default()).convert(text, width, height, fit)
}
