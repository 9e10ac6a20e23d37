//! HTTP transport used by [`Client`](crate::Client). The client builds the URL and the JSON body;
//! a transport only moves bytes.
use std::{future::Future, sync::Arc};

use reqwest::header::CONTENT_TYPE;
use url::Url;

/// Response returned by a [`Transport`]. Non-2xx statuses are returned as data, the client decides
/// what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_owned();
        HttpResponse {
            status,
            status_text,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// The transport could not obtain an HTTP response at all.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no HTTP response: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Arc<reqwest::Error>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(value: reqwest::Error) -> Self {
        let value = value.without_url();
        TransportError {
            message: value.to_string(),
            source: Some(Arc::new(value)),
        }
    }
}

/// Sends a JSON body with HTTP POST.
///
/// Implementations must be cheap to share between tasks; the client calls `post_json` from many
/// concurrent callers.
pub trait Transport: Send + Sync {
    /// POST `body` (already JSON-encoded) to `url`.
    fn post_json(
        &self,
        url: Url,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn post_json(
        &self,
        url: Url,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).post_json(url, body)
    }
}

/// [`Transport`] backed by an async `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport::default()
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies, TLS settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    async fn post_json(&self, url: Url, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        // A body that cannot be read leaves us without a usable response.
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown Status").to_owned(),
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HttpResponse;

    #[test]
    fn success_range_is_inclusive() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(299, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(300, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn fills_canonical_reason() {
        assert_eq!(HttpResponse::new(500, "").status_text, "Internal Server Error");
        assert_eq!(HttpResponse::new(204, "").status_text, "No Content");
    }
}
