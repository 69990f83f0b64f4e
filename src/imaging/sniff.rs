//! Source format classification.
//!
//! Two classifiers:
//!
//! - [`classify`] reads the declared media type of the `data:` header,
//!   checking PNG, then JPEG, then WebP. A missing or unknown declaration is
//!   an [`UnsupportedFormat`](ConvertError::UnsupportedFormat) error.
//! - [`detect`] inspects the leading bytes for container signatures.
//!
//! [`SniffMode`] selects which one is authoritative for the pipeline.

use super::format::SourceFormat;
use super::transcode::DataUrl;
use crate::error::ConvertError;
use serde::{Deserialize, Serialize};

/// Which classifier decides the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SniffMode {
    /// Trust the declared media type.
    #[default]
    Declared,
    /// Trust the byte signature; the declaration only appears in errors.
    Content,
}

fn declared_label(text: &DataUrl) -> String {
    text.media_type().unwrap_or("<none>").to_string()
}

/// Classify by the declared media type in the `data:` header.
pub fn classify(text: &DataUrl) -> Result<SourceFormat, ConvertError> {
    let header = text.header().unwrap_or_default();
    SourceFormat::ALL
        .into_iter()
        .find(|format| header.contains(format.mime_type()))
        .ok_or_else(|| ConvertError::UnsupportedFormat {
            declared: declared_label(text),
        })
}

/// Detect the container format from magic bytes.
pub fn detect(bytes: &[u8]) -> Option<SourceFormat> {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if bytes.starts_with(PNG) {
        return Some(SourceFormat::Png);
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(SourceFormat::Jpeg);
    }
    // RIFF....WEBP
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(SourceFormat::WebP);
    }
    None
}

/// Pick the source format according to `mode`.
pub fn resolve(mode: SniffMode, text: &DataUrl, bytes: &[u8]) -> Result<SourceFormat, ConvertError> {
    match mode {
        SniffMode::Declared => classify(text),
        SniffMode::Content => detect(bytes).ok_or_else(|| ConvertError::UnsupportedFormat {
            declared: format!("{} (no recognized signature)", declared_label(text)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(header: &str) -> DataUrl {
        DataUrl::new(format!("data:{header},AAAA"))
    }

    #[test]
    fn classify_each_supported_declaration() {
        assert_eq!(classify(&url("image/png;base64")).unwrap(), SourceFormat::Png);
        assert_eq!(classify(&url("image/jpeg;base64")).unwrap(), SourceFormat::Jpeg);
        assert_eq!(classify(&url("image/webp;base64")).unwrap(), SourceFormat::WebP);
    }

    #[test]
    fn classify_rejects_gif_and_bmp() {
        for header in ["image/gif;base64", "image/bmp;base64"] {
            let err = classify(&url(header)).unwrap_err();
            assert!(matches!(err, ConvertError::UnsupportedFormat { .. }), "{header}");
        }
    }

    #[test]
    fn classify_rejects_missing_declaration() {
        let err = classify(&DataUrl::from("iVBORw0KGgo=")).unwrap_err();
        assert_eq!(
            err,
            ConvertError::UnsupportedFormat {
                declared: "<none>".into()
            }
        );
    }

    #[test]
    fn classify_ignores_payload_text() {
        // "image/png" inside the payload is not a declaration
        let text = DataUrl::from("data:image/gif;base64,image/png");
        assert!(classify(&text).is_err());
    }

    #[test]
    fn classify_prefers_png_over_later_matches() {
        let text = url("image/png;x=image/jpeg;base64");
        assert_eq!(classify(&text).unwrap(), SourceFormat::Png);
    }

    #[test]
    fn detect_signatures() {
        assert_eq!(
            detect(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(SourceFormat::Png)
        );
        assert_eq!(detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(SourceFormat::Jpeg));
        assert_eq!(detect(b"RIFF\x10\0\0\0WEBPVP8L"), Some(SourceFormat::WebP));
        assert_eq!(detect(b"GIF89a"), None);
        assert_eq!(detect(b"RIFF"), None);
        assert_eq!(detect(&[]), None);
    }

    #[test]
    fn content_mode_trusts_bytes_over_label() {
        let text = url("image/bmp;base64");
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(resolve(SniffMode::Content, &text, &png).unwrap(), SourceFormat::Png);
        assert!(resolve(SniffMode::Declared, &text, &png).is_err());
    }

    #[test]
    fn content_mode_reports_declared_label_on_miss() {
        let text = url("image/bmp;base64");
        let err = resolve(SniffMode::Content, &text, b"BM....").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported image format: image/bmp (no recognized signature)"
        );
    }
}
