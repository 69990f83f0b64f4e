//! Binary/text boundary: `data:` URLs and bare base64.
//!
//! Input may arrive as `data:image/png;base64,iVBOR...` or as the bare
//! base64 payload. [`decode`] strips at most one `data:...,` prefix and
//! decodes the rest; [`encode`] produces the prefixed form.
//!
//! Decoding accepts padded and unpadded payloads and ignores embedded ASCII
//! whitespace (line-wrapped base64 is common in pasted input).

use crate::error::ConvertError;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use std::fmt;

const SCHEME: &str = "data:";

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A textual image: `data:<media-type>;base64,<payload>` or a bare payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataUrl(String);

impl DataUrl {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything between `data:` and the first comma, e.g. `image/png;base64`.
    ///
    /// `None` when the text carries no `data:` prefix.
    pub fn header(&self) -> Option<&str> {
        let rest = self.0.trim_start().strip_prefix(SCHEME)?;
        rest.split_once(',').map(|(header, _)| header)
    }

    /// The declared media type without parameters, e.g. `image/png`.
    pub fn media_type(&self) -> Option<&str> {
        self.header()
            .map(|header| header.split(';').next().unwrap_or(header).trim())
            .filter(|media_type| !media_type.is_empty())
    }

    /// The encoded payload with one `data:...,` prefix removed.
    pub fn payload(&self) -> &str {
        let text = self.0.trim();
        match text.strip_prefix(SCHEME).and_then(|rest| rest.split_once(',')) {
            Some((_, payload)) => payload,
            None => text,
        }
    }
}

impl From<String> for DataUrl {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for DataUrl {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for DataUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upper bound on the decoded length of a base64 payload.
fn decoded_upper_bound(payload: &str) -> u64 {
    (payload.len() as u64).div_ceil(4) * 3
}

/// Decode the payload of `text` into raw bytes.
pub fn decode(text: &DataUrl) -> Result<Vec<u8>, ConvertError> {
    decode_with_limit(text, u64::MAX)
}

/// Decode the payload, rejecting payloads whose decoded size could exceed
/// `max_bytes` before allocating for them.
pub fn decode_with_limit(text: &DataUrl, max_bytes: u64) -> Result<Vec<u8>, ConvertError> {
    let payload = text.payload();

    let estimated = decoded_upper_bound(payload);
    if estimated > max_bytes {
        return Err(ConvertError::transcode(format!(
            "payload of up to {estimated} bytes exceeds the {max_bytes} byte limit"
        )));
    }

    let result = if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        LENIENT.decode(compact)
    } else {
        LENIENT.decode(payload)
    };

    let bytes = result.map_err(ConvertError::transcode)?;
    if bytes.is_empty() {
        return Err(ConvertError::transcode("payload is empty"));
    }
    Ok(bytes)
}

/// Wrap `bytes` as a `data:<media_type>;base64,` URL.
pub fn encode(bytes: &[u8], media_type: &str) -> DataUrl {
    DataUrl(format!("{SCHEME}{media_type};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_data_url_prefix() {
        let text = DataUrl::from("data:image/png;base64,aGVsbG8=");
        assert_eq!(decode(&text).unwrap(), b"hello");
    }

    #[test]
    fn decode_accepts_bare_payload() {
        assert_eq!(decode(&DataUrl::from("aGVsbG8=")).unwrap(), b"hello");
    }

    #[test]
    fn decode_accepts_missing_padding_and_whitespace() {
        assert_eq!(decode(&DataUrl::from("aGVs\nbG8")).unwrap(), b"hello");
        assert_eq!(decode(&DataUrl::from("  aGVsbG8=\r\n")).unwrap(), b"hello");
    }

    #[test]
    fn decode_strips_only_one_prefix() {
        let text = DataUrl::from("data:image/png;base64,data:image/png;base64,aGVsbG8=");
        assert!(decode(&text).is_err());
    }

    #[test]
    fn decode_rejects_characters_outside_alphabet() {
        let err = decode(&DataUrl::from("data:image/png;base64,@@@@")).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { format: None, .. }));
    }

    #[test]
    fn decode_rejects_empty_payload() {
        assert!(decode(&DataUrl::from("data:image/png;base64,")).is_err());
    }

    #[test]
    fn decode_with_limit_rejects_oversized_payload() {
        let text = DataUrl::from("aGVsbG8gd29ybGQ=");
        assert!(decode_with_limit(&text, 4).is_err());
        assert_eq!(decode_with_limit(&text, 12).unwrap(), b"hello world");
    }

    #[test]
    fn encode_announces_media_type() {
        let url = encode(b"hello", "image/webp");
        assert_eq!(url.as_str(), "data:image/webp;base64,aGVsbG8=");
        assert_eq!(url.media_type(), Some("image/webp"));
        assert_eq!(decode(&url).unwrap(), b"hello");
    }

    #[test]
    fn header_and_media_type() {
        let url = DataUrl::from("data:image/jpeg;base64,AAAA");
        assert_eq!(url.header(), Some("image/jpeg;base64"));
        assert_eq!(url.media_type(), Some("image/jpeg"));
        assert_eq!(url.payload(), "AAAA");

        let bare = DataUrl::from("AAAA");
        assert_eq!(bare.header(), None);
        assert_eq!(bare.media_type(), None);
        assert_eq!(bare.payload(), "AAAA");
    }
}
