use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("token refresh failed: {0}")]
    Auth(#[source] Arc<Error>),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("response contained no {0}")]
    MissingData(&'static str),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Returns the platform error payload, looking through a failed token refresh.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            Error::Auth(inner) => inner.api_error(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(err) => err.status(),
            _ => self.api_error().and_then(ApiError::status),
        }
    }
}

/// Error payload returned by the platform for every non-success response.
#[derive(Clone, Debug, Default, Deserialize, thiserror::Error)]
#[error("{error_description}")]
pub struct ApiError {
    #[serde(skip)]
    status: u16,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub exception: String,
}

impl ApiError {
    /// Decodes the platform error payload of a failed response.
    pub(crate) fn decode(status: StatusCode, body: &[u8]) -> Result<Self, Error> {
        let mut err: ApiError = serde_json::from_slice(body)?;
        err.status = status.as_u16();
        Ok(err)
    }

    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    /// Server-side time the error was produced, when the platform reported one.
    pub fn timestamp(&self) -> Option<jiff::Timestamp> {
        if self.timestamp <= 0 {
            return None;
        }
        jiff::Timestamp::from_millisecond(self.timestamp).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_description_verbatim() {
        let body = br#"{"error":"x","error_description":"bad request","timestamp":1700000000000,"duration":0,"exception":"java.lang.IllegalArgumentException"}"#;
        let err = ApiError::decode(StatusCode::BAD_REQUEST, body).unwrap();
        assert_eq!(err.to_string(), "bad request");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.exception, "java.lang.IllegalArgumentException");
        assert_eq!(
            err.timestamp().map(|ts| ts.as_millisecond()),
            Some(1_700_000_000_000)
        );

        let wrapped = Error::from(err);
        assert_eq!(wrapped.to_string(), "bad request");
    }

    #[test]
    fn missing_fields_default_and_zero_timestamp_is_absent() {
        let err = ApiError::decode(StatusCode::NOT_FOUND, br#"{"error":"gone"}"#).unwrap();
        assert_eq!(err.error, "gone");
        assert!(err.error_description.is_empty());
        assert!(err.timestamp().is_none());
    }

    #[test]
    fn undecodable_payload_is_a_json_error() {
        let err = ApiError::decode(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn auth_error_exposes_inner_platform_error() {
        let api = ApiError::decode(
            StatusCode::UNAUTHORIZED,
            br#"{"error":"invalid_grant","error_description":"client secret mismatch"}"#,
        )
        .unwrap();
        let err = Error::Auth(Arc::new(Error::Api(api)));
        assert_eq!(err.to_string(), "token refresh failed: client secret mismatch");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.api_error().unwrap().error, "invalid_grant");
    }
}
