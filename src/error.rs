use std::sync::Arc;

use thiserror::Error;

/// Result type used throughout the SDK.
pub type Result<T> = std::result::Result<T, Error>;

/// Status code reported in [`Error::RequestFailed`] when the transport produced no response.
pub const NO_RESPONSE_STATUS: i32 = -1;

/// Errors returned by the SDK.
///
/// [`Error::NotInitialized`], [`Error::InvalidUrl`], [`Error::RequestFailed`] and
/// [`Error::DecodingFailed`] are the only kinds the client and tracker ever produce.
/// [`Error::InvalidAppId`] is returned by [`AdSdk`](crate::AdSdk) only.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// An operation was invoked before an app id was supplied.
    #[error("not initialized, call initialize() first")]
    NotInitialized,

    /// The endpoint computed from the configured base URL is not a valid URL.
    #[error("invalid base_url configuration")]
    InvalidUrl(#[source] url::ParseError),

    /// No HTTP response was obtained (`status_code == -1`), or the response status was outside
    /// `200..=299`.
    #[error("request failed with status {status_code}: {status_text}")]
    RequestFailed {
        /// HTTP status, or `-1` when the transport produced no response.
        status_code: i32,
        /// Reason phrase for the status.
        status_text: String,
    },

    /// A JSON body did not match the expected shape.
    #[error("failed to decode payload")]
    // serde_json::Error is not clonable, so we're wrapping it in an Arc.
    DecodingFailed(#[source] Arc<serde_json::Error>),

    /// The app id passed to [`AdSdk::initialize`](crate::AdSdk::initialize) was empty.
    #[error("app_id must not be empty")]
    InvalidAppId,
}

impl Error {
    pub(crate) fn no_response() -> Self {
        Error::RequestFailed {
            status_code: NO_RESPONSE_STATUS,
            status_text: "No HTTP response".to_owned(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::DecodingFailed(Arc::new(value))
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Self {
        Error::InvalidUrl(value)
    }
}
