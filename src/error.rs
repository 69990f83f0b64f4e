//! Error taxonomy for the conversion pipeline.
//!
//! Every stage returns [`ConvertError`]. The pipeline never catches and
//! continues: the first error aborts the call and is handed to the caller,
//! which decides how to report it. [`ConvertError::is_client_error`] splits
//! the variants into "bad input" (400-class) and "our fault" (500-class).

use crate::imaging::format::SourceFormat;
use crate::imaging::runtime::RuntimeKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Textual transcoding failed (`format: None`) or a source decoder
    /// rejected its bytes.
    #[error("failed to decode {}: {message}", decode_subject(.format))]
    Decode {
        format: Option<SourceFormat>,
        message: String,
    },
    #[error("unsupported image format: {declared}")]
    UnsupportedFormat { declared: String },
    #[error("invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("WebP encode failed: {0}")]
    Encode(String),
    #[error("{runtime} runtime failed to initialize: {message}")]
    RuntimeInitialization { runtime: RuntimeKind, message: String },
}

fn decode_subject(format: &Option<SourceFormat>) -> String {
    match format {
        Some(format) => format!("{format} input"),
        None => "base64 payload".to_string(),
    }
}

impl ConvertError {
    pub(crate) fn decode(format: SourceFormat, message: impl ToString) -> Self {
        Self::Decode {
            format: Some(format),
            message: message.to_string(),
        }
    }

    pub(crate) fn transcode(message: impl ToString) -> Self {
        Self::Decode {
            format: None,
            message: message.to_string(),
        }
    }

    /// Whether the failure is caused by the caller's input.
    ///
    /// Encode and runtime initialization failures are internal: a valid
    /// pixel buffer should always encode, and a broken runtime affects every
    /// request for that format.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::UnsupportedFormat { .. } | Self::InvalidDimensions { .. }
        )
    }

    /// HTTP-style status class for the failure.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}
