use std::sync::Arc;

use url::Url;

use crate::{
    configuration_store::{Configuration, ConfigurationStore},
    payload::{AdRequest, AdResponse, AdResult, EventPayload, RequestPayload},
    ClientConfig, Error, Result, Transport,
};

const REQUESTS_ENDPOINT: &str = "/requests";
const EVENTS_ENDPOINT: &str = "/events";

/// A client for the ads API.
///
/// The client is the only component that performs network I/O. It is `Sync` and meant to be
/// shared (e.g. in an `Arc`) between every caller that requests ads or reports events.
///
/// # Initialization
///
/// [`Client::request_ad`] and [`Client::send_event`] fail with [`Error::NotInitialized`] until
/// [`Client::initialize`] has supplied an app id.
///
/// # Examples
/// ```no_run
/// # async fn run() -> chat_ads::Result<()> {
/// use chat_ads::{AdRequest, ClientConfig};
///
/// let client = ClientConfig::new().to_client();
/// client.initialize("app-1", None);
///
/// let result = client
///     .request_ad(&AdRequest::new("c1", "m1", "learning english vocabulary"))
///     .await?;
/// if let Some(ad) = result.ad {
///     println!("{} by {}", ad.title, ad.advertiser_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client<T> {
    configuration_store: ConfigurationStore,
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Create a new `Client` using the specified configuration and transport.
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Client {
            configuration_store: ConfigurationStore::new(config.base_url, config.sdk_version),
            transport,
        }
    }

    /// Store the app id and optionally replace the base URL.
    ///
    /// An empty or missing `base_url` keeps the current one. Calling `initialize` again overwrites
    /// the previous values. The app id is stored as given, even when empty; see
    /// [`AdSdk::initialize`](crate::AdSdk::initialize) for a validating entry point.
    pub fn initialize(&self, app_id: impl Into<String>, base_url: Option<&str>) {
        let configuration = self
            .configuration_store
            .initialize(app_id.into(), base_url.map(str::to_owned));
        log::debug!(target: "chat_ads",
                    app_id = configuration.app_id.as_deref(),
                    base_url = configuration.base_url.as_str();
                    "client initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.configuration_store.snapshot().is_initialized()
    }

    /// Current configuration snapshot.
    pub fn configuration(&self) -> Arc<Configuration> {
        self.configuration_store.snapshot()
    }

    /// Request an ad matching the conversation context.
    ///
    /// A successful response without a matching ad returns `Ok` with `ad == None`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if [`Client::initialize`] was not called.
    /// - [`Error::InvalidUrl`] if the base URL does not form a valid endpoint.
    /// - [`Error::RequestFailed`] with status `-1` if no response was obtained, or with the HTTP
    ///   status if it was outside `200..=299`.
    /// - [`Error::DecodingFailed`] if the response body is not a valid response envelope.
    pub async fn request_ad(&self, request: &AdRequest) -> Result<AdResult> {
        let configuration = self.configuration_store.snapshot();
        let Some(app_id) = configuration.app_id.as_deref() else {
            log::warn!(target: "chat_ads", "requesting an ad before the client has been initialized");
            return Err(Error::NotInitialized);
        };

        let url = endpoint(&configuration.base_url, REQUESTS_ENDPOINT)?;
        let payload = RequestPayload::new(app_id, &configuration.sdk_version, request);

        log::debug!(target: "chat_ads",
                    conversation_id = request.conversation_id.as_str(),
                    message_id = request.message_id.as_str();
                    "requesting ad");
        let body = self.post(url, &payload).await?;

        let response: AdResponse = serde_json::from_slice(&body).map_err(|err| {
            log::warn!(target: "chat_ads", "failed to parse ad response body: {:?}", err);
            Error::from(err)
        })?;

        if !response.ok {
            log::warn!(target: "chat_ads",
                       request_id = response.request_id.as_deref();
                       "ad response reported ok=false");
        }
        log::trace!(target: "chat_ads",
                    request_id = response.request_id.as_deref(),
                    ad_id = response.ad.as_ref().map(|ad| ad.id.as_str());
                    "received ad response");

        Ok(response.into())
    }

    /// Report an engagement event. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Client::request_ad`], except that the response body is never decoded.
    pub async fn send_event(&self, payload: &EventPayload) -> Result<()> {
        let configuration = self.configuration_store.snapshot();
        if !configuration.is_initialized() {
            log::warn!(target: "chat_ads", "sending an event before the client has been initialized");
            return Err(Error::NotInitialized);
        }

        let url = endpoint(&configuration.base_url, EVENTS_ENDPOINT)?;

        log::debug!(target: "chat_ads",
                    event_type:serde = payload.event_type(),
                    ad_id = payload.ad_id.as_str(),
                    request_id = payload.request_id.as_str();
                    "sending event");
        self.post(url, payload).await?;

        Ok(())
    }

    /// POST `payload` as JSON and return the body of a 2xx response.
    async fn post(&self, url: Url, payload: &impl serde::Serialize) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(payload)?;

        let response = self.transport.post_json(url, body).await.map_err(|err| {
            log::warn!(target: "chat_ads", "no response from ads backend: {}", err);
            Error::no_response()
        })?;

        if !response.is_success() {
            log::warn!(target: "chat_ads",
                       status = response.status;
                       "received non-2xx response: {}", response.status_text);
            return Err(Error::RequestFailed {
                status_code: i32::from(response.status),
                status_text: response.status_text,
            });
        }

        Ok(response.body)
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let url = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), path))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use url::Url;

    use super::endpoint;
    use crate::{
        payload::{EventKind, EventPayload},
        AdRequest, ClientConfig, Error, HttpResponse, Transport, TransportError,
    };

    /// Replays one canned outcome and records every request.
    #[derive(Default)]
    struct RecordingTransport {
        response: Option<HttpResponse>,
        requests: Mutex<Vec<(Url, serde_json::Value)>>,
    }

    impl RecordingTransport {
        fn respond(status: u16, body: serde_json::Value) -> Self {
            RecordingTransport {
                response: Some(HttpResponse::new(status, body.to_string())),
                ..Default::default()
            }
        }

        fn requests(&self) -> Vec<(Url, serde_json::Value)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        async fn post_json(&self, url: Url, body: Vec<u8>) -> Result<HttpResponse, TransportError> {
            let body = serde_json::from_slice(&body).unwrap();
            self.requests.lock().unwrap().push((url, body));
            self.response
                .clone()
                .ok_or_else(|| TransportError::new("connection refused"))
        }
    }

    fn client(transport: RecordingTransport) -> crate::Client<Arc<RecordingTransport>> {
        ClientConfig::new()
            .base_url("https://ads.test/v1")
            .to_client_with_transport(Arc::new(transport))
    }

    fn click() -> EventPayload {
        EventPayload {
            kind: EventKind::Click,
            ad_id: "ad-1".to_owned(),
            advertiser_id: "adv-1".to_owned(),
            request_id: "r1".to_owned(),
            app_id: "app-1".to_owned(),
            conversation_id: None,
            user_id: None,
        }
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            endpoint("https://ads.test/v1/", "/events").unwrap().as_str(),
            "https://ads.test/v1/events"
        );
    }

    #[test]
    fn endpoint_rejects_malformed_base_url() {
        assert!(matches!(
            endpoint("not a url", "/events"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn request_ad_before_initialize_fails() {
        let transport = Arc::new(RecordingTransport::respond(200, json!({ "ok": true })));
        let client = ClientConfig::new().to_client_with_transport(transport.clone());

        let result = client.request_ad(&AdRequest::new("c1", "m1", "text")).await;

        assert!(matches!(result, Err(Error::NotInitialized)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn send_event_before_initialize_fails() {
        let client = client(RecordingTransport::respond(200, json!({})));
        assert!(matches!(
            client.send_event(&click()).await,
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn empty_app_id_still_initializes() {
        let client = client(RecordingTransport::default());
        client.initialize("", None);
        assert!(client.is_initialized());
    }

    #[tokio::test]
    async fn request_ad_posts_payload_to_requests_endpoint() {
        let transport = Arc::new(RecordingTransport::respond(
            200,
            json!({ "ok": true, "ad": null, "requestId": "r9" }),
        ));
        let client = ClientConfig::new()
            .base_url("https://ads.test/v1")
            .to_client_with_transport(transport.clone());
        client.initialize("app-1", None);

        let result = client
            .request_ad(&AdRequest::new("c1", "m1", "hello").user_id("u1"))
            .await
            .unwrap();

        assert_eq!(result.ad, None);
        assert_eq!(result.request_id.as_deref(), Some("r9"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (url, body) = &requests[0];
        assert_eq!(url.as_str(), "https://ads.test/v1/requests");
        assert_eq!(body["appId"], "app-1");
        assert_eq!(body["userId"], "u1");
        assert_eq!(body["sdkVersion"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["formats"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn initialize_override_changes_endpoint() {
        let transport = Arc::new(RecordingTransport::respond(200, json!({})));
        let client = ClientConfig::new().to_client_with_transport(transport.clone());
        client.initialize("app-1", Some("http://localhost:9000/"));

        client.send_event(&click()).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].0.as_str(), "http://localhost:9000/events");
    }

    #[tokio::test]
    async fn invalid_base_url_fails_before_sending() {
        let transport = Arc::new(RecordingTransport::respond(200, json!({})));
        let client = ClientConfig::new().to_client_with_transport(transport.clone());
        client.initialize("app-1", Some("::not-a-url"));

        let result = client.request_ad(&AdRequest::new("c1", "m1", "text")).await;

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_maps_to_no_response() {
        let client = client(RecordingTransport::default());
        client.initialize("app-1", None);

        let err = client.send_event(&click()).await.unwrap_err();

        assert!(matches!(
            err,
            Error::RequestFailed { status_code: -1, ref status_text } if status_text == "No HTTP response"
        ));
    }

    #[tokio::test]
    async fn non_2xx_maps_to_request_failed() {
        let client = client(RecordingTransport::respond(404, json!({ "error": "nope" })));
        client.initialize("app-1", None);

        let err = client
            .request_ad(&AdRequest::new("c1", "m1", "text"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RequestFailed { status_code: 404, ref status_text } if status_text == "Not Found"
        ));
    }

    #[tokio::test]
    async fn malformed_envelope_maps_to_decoding_failed() {
        let client = client(RecordingTransport::respond(200, json!({ "ad": 42 })));
        client.initialize("app-1", None);

        let err = client
            .request_ad(&AdRequest::new("c1", "m1", "text"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DecodingFailed(_)));
    }

    #[tokio::test]
    async fn not_ok_envelope_is_passed_through() {
        let client = client(RecordingTransport::respond(
            200,
            json!({ "ok": false, "ad": null, "requestId": "r1" }),
        ));
        client.initialize("app-1", None);

        let result = client
            .request_ad(&AdRequest::new("c1", "m1", "text"))
            .await
            .unwrap();

        assert_eq!(result.ad, None);
        assert_eq!(result.request_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn send_event_ignores_response_body() {
        let transport = Arc::new(RecordingTransport {
            response: Some(HttpResponse::new(204, "not json at all")),
            ..Default::default()
        });
        let client = ClientConfig::new().to_client_with_transport(transport.clone());
        client.initialize("app-1", None);

        client.send_event(&click()).await.unwrap();

        let requests = transport.requests();
        let (url, body) = &requests[0];
        assert!(url.as_str().ends_with("/events"));
        assert_eq!(body["type"], "click");
    }
}
