//! Request-level input contract.
//!
//! A conversion request is a JSON body:
//!
//! ```json
//! { "image": "data:image/png;base64,...", "width": 256, "height": 256, "fitMethod": "contain" }
//! ```
//!
//! Only `image` is required. Validation here runs before the pipeline: a
//! missing image or an unknown `fitMethod` is rejected without touching any
//! codec.

use crate::error::ConvertError;
use crate::imaging::{DataUrl, FitMethod, ParseFitMethodError};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("invalid request body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request has no image")]
    MissingImage,
    #[error(transparent)]
    InvalidFitMethod(#[from] ParseFitMethodError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl RequestError {
    /// HTTP-style status class: 400 for anything the caller sent, 500 for
    /// internal pipeline failures.
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::Convert(err) => err.status_code(),
            _ => 400,
        }
    }
}

/// Raw request body as sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub image: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub fit_method: Option<String>,
}

/// A request that passed caller-side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub image: DataUrl,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<FitMethod>,
}

impl ConvertRequest {
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn validate(self) -> Result<ValidatedRequest, RequestError> {
        let image = self
            .image
            .filter(|image| !image.trim().is_empty())
            .ok_or(RequestError::MissingImage)?;
        let fit = self
            .fit_method
            .as_deref()
            .map(str::parse::<FitMethod>)
            .transpose()?;

        let dimension = |value: Option<i64>| -> Result<Option<u32>, ConvertError> {
            value
                .map(|v| {
                    u32::try_from(v).map_err(|_| ConvertError::InvalidDimensions {
                        width: self.width.unwrap_or_default(),
                        height: self.height.unwrap_or_default(),
                    })
                })
                .transpose()
        };

        Ok(ValidatedRequest {
            image: DataUrl::new(image),
            width: dimension(self.width)?,
            height: dimension(self.height)?,
            fit,
        })
    }
}

/// Parse, validate, and convert a JSON request body.
pub fn handle(pipeline: &Pipeline<'_>, body: &str) -> Result<DataUrl, RequestError> {
    let request = ConvertRequest::from_json(body)?.validate()?;
    Ok(pipeline.convert(&request.image, request.width, request.height, request.fit)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Runtimes, SourceFormat};
    use crate::pipeline::PipelineOptions;
    use crate::test_helpers::*;

    #[test]
    fn parses_camel_case_body() {
        let request =
            ConvertRequest::from_json(r#"{"image":"AAAA","width":10,"height":20,"fitMethod":"stretch"}"#)
                .unwrap();
        assert_eq!(request.fit_method.as_deref(), Some("stretch"));
        let valid = request.validate().unwrap();
        assert_eq!(valid.width, Some(10));
        assert_eq!(valid.height, Some(20));
        assert_eq!(valid.fit, Some(FitMethod::Stretch));
    }

    #[test]
    fn missing_image_is_rejected() {
        for body in [r#"{}"#, r#"{"image":""}"#, r#"{"image":null,"width":5}"#] {
            let err = ConvertRequest::from_json(body).unwrap().validate().unwrap_err();
            assert!(matches!(err, RequestError::MissingImage), "{body}");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn unknown_fit_method_is_rejected() {
        let err = ConvertRequest::from_json(r#"{"image":"AAAA","fitMethod":"cover"}"#)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidFitMethod(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn negative_dimension_is_invalid() {
        let err = ConvertRequest::from_json(r#"{"image":"AAAA","width":-5,"height":10}"#)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::Convert(ConvertError::InvalidDimensions {
                width: -5,
                height: 10
            })
        ));
    }

    #[test]
    fn malformed_json_is_client_error() {
        let err = ConvertRequest::from_json("{not json").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn handle_converts_valid_request() {
        let runtimes = Runtimes::default();
        let pipeline = Pipeline::new(&runtimes, PipelineOptions::default());
        let image = data_url(SourceFormat::Png, &encode_png(&solid(8, 4, RED)));
        let body = serde_json::json!({
            "image": image.as_str(),
            "width": 4,
            "height": 4,
        })
        .to_string();

        let output = handle(&pipeline, &body).unwrap();
        assert_eq!(decode_output(&output).dimensions(), (4, 4));
    }

    #[test]
    fn handle_reports_unsupported_format_as_400() {
        let runtimes = Runtimes::default();
        let pipeline = Pipeline::new(&runtimes, PipelineOptions::default());
        let err = handle(&pipeline, r#"{"image":"data:image/gif;base64,R0lGODlh"}"#).unwrap_err();
        assert!(matches!(
            err,
            RequestError::Convert(ConvertError::UnsupportedFormat { .. })
        ));
        assert_eq!(err.status_code(), 400);
    }
}
