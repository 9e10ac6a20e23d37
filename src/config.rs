use semver::Version;

use crate::{transport::ReqwestTransport, Client, Transport};

/// Configuration for [`Client`].
///
/// The app id is not part of the configuration. It is supplied later via
/// [`Client::initialize`].
///
/// # Examples
/// ```
/// # use chat_ads::ClientConfig;
/// let client = ClientConfig::new()
///     .base_url("https://ads.staging.example.com/v1")
///     .to_client();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) base_url: String,
    pub(crate) sdk_version: Version,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: ClientConfig::DEFAULT_BASE_URL.to_owned(),
            sdk_version: default_sdk_version(),
        }
    }
}

impl ClientConfig {
    /// Default base URL for API calls.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.chatads.dev/v1";

    /// Create a configuration pointing at the production endpoint.
    ///
    /// ```
    /// # use chat_ads::ClientConfig;
    /// ClientConfig::new();
    /// ```
    pub fn new() -> Self {
        ClientConfig::default()
    }

    /// Override base URL for API calls. Clients should use the default setting in most cases.
    ///
    /// The base URL can also be replaced later by passing an override to
    /// [`Client::initialize`].
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the SDK version reported with every ad request.
    pub fn sdk_version(mut self, sdk_version: Version) -> Self {
        self.sdk_version = sdk_version;
        self
    }

    /// Create a new [`Client`] that talks to the network through `reqwest`.
    pub fn to_client(self) -> Client<ReqwestTransport> {
        Client::new(self, ReqwestTransport::new())
    }

    /// Create a new [`Client`] using a custom [`Transport`].
    pub fn to_client_with_transport<T: Transport>(self, transport: T) -> Client<T> {
        Client::new(self, transport)
    }
}

fn default_sdk_version() -> Version {
    // CARGO_PKG_VERSION is always valid semver, cargo refuses to build otherwise.
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}
