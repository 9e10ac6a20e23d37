use std::sync::Arc;

use crate::{
    transport::ReqwestTransport, AdRequest, AdResult, Client, ClientConfig, Error, EventTracker,
    Result, Transport,
};

/// Entry point for applications: one [`Client`] and the [`EventTracker`] wrapping it, initialized
/// together.
///
/// # Examples
/// ```no_run
/// # async fn run() -> chat_ads::Result<()> {
/// use chat_ads::{AdRequest, AdSdk, ClientConfig};
///
/// let sdk = AdSdk::new(ClientConfig::new());
/// sdk.initialize("app-1", None)?;
/// sdk.set_conversation(Some("c1".to_owned()), None)?;
///
/// let result = sdk
///     .request_ad(&AdRequest::new("c1", "m1", "learning english vocabulary"))
///     .await?;
/// if let Some(ad) = result.ad {
///     sdk.tracker().spawn_impression(ad, result.request_id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AdSdk<T = ReqwestTransport> {
    client: Arc<Client<T>>,
    tracker: Arc<EventTracker<T>>,
}

impl AdSdk<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        AdSdk::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> AdSdk<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let client = Arc::new(config.to_client_with_transport(transport));
        let tracker = Arc::new(EventTracker::new(Arc::clone(&client)));
        AdSdk { client, tracker }
    }

    /// Initialize the client and the tracker.
    ///
    /// Conversation and user ids already set with [`AdSdk::set_conversation`] are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAppId`] if `app_id` is empty. Nothing is initialized in that case.
    pub fn initialize(&self, app_id: &str, base_url: Option<&str>) -> Result<()> {
        if app_id.is_empty() {
            log::warn!(target: "chat_ads", "refusing to initialize with an empty app_id");
            return Err(Error::InvalidAppId);
        }

        self.client.initialize(app_id, base_url);

        self.tracker.set_app_id(app_id);
        Ok(())
    }

    /// Attach a conversation and user to every subsequent event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if called before [`AdSdk::initialize`].
    pub fn set_conversation(
        &self,
        conversation_id: Option<String>,
        user_id: Option<String>,
    ) -> Result<()> {
        let Some(app_id) = self.client.configuration().app_id.clone() else {
            return Err(Error::NotInitialized);
        };
        self.tracker.init_tracker(app_id, conversation_id, user_id);
        Ok(())
    }

    pub async fn request_ad(&self, request: &AdRequest) -> Result<AdResult> {
        self.client.request_ad(request).await
    }

    pub fn client(&self) -> &Arc<Client<T>> {
        &self.client
    }

    pub fn tracker(&self) -> &Arc<EventTracker<T>> {
        &self.tracker
    }
}
