//! Turns presentation-layer interactions into engagement events.
//!
//! Impressions are deduplicated per `(ad id, request id)` for the lifetime of the tracker. Clicks,
//! submits and option taps are sent every time they are tracked; the UI is expected to disable
//! its control while a send is in flight.
//!
//! The set of seen impressions lives in memory only and is lost on restart.
use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, RwLock},
};

use tokio::{runtime::Handle, task::JoinHandle};

use crate::{
    ad::ResolvedAd,
    payload::{EventKind, EventPayload},
    Client, Error, Result, Transport,
};

/// Substituted for a missing request id in event payloads and dedup keys.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackerIdentity {
    app_id: String,
    conversation_id: Option<String>,
    user_id: Option<String>,
}

/// Reports engagement events through a shared [`Client`].
pub struct EventTracker<T> {
    client: Arc<Client<T>>,
    identity: RwLock<Option<Arc<TrackerIdentity>>>,
    seen_impressions: Mutex<HashSet<(String, String)>>,
}

impl<T: Transport> EventTracker<T> {
    pub fn new(client: Arc<Client<T>>) -> Self {
        EventTracker {
            client,
            identity: RwLock::new(None),
            seen_impressions: Mutex::new(HashSet::new()),
        }
    }

    pub fn client(&self) -> &Arc<Client<T>> {
        &self.client
    }

    /// Set the identifiers attached to every event. May be called again to switch conversation
    /// or user; impressions already seen stay deduplicated.
    pub fn init_tracker(
        &self,
        app_id: impl Into<String>,
        conversation_id: Option<String>,
        user_id: Option<String>,
    ) {
        let identity = Arc::new(TrackerIdentity {
            app_id: app_id.into(),
            conversation_id,
            user_id,
        });
        let mut slot = self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(identity);
    }

    /// Replace the app id, keeping the conversation and user ids already attached to events.
    /// Initializes the tracker without a conversation or user if it was not initialized yet.
    pub fn set_app_id(&self, app_id: impl Into<String>) {
        let mut slot = self
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (conversation_id, user_id) = match slot.as_deref() {
            Some(identity) => (identity.conversation_id.clone(), identity.user_id.clone()),
            None => (None, None),
        };
        *slot = Some(Arc::new(TrackerIdentity {
            app_id: app_id.into(),
            conversation_id,
            user_id,
        }));
    }

    pub fn is_initialized(&self) -> bool {
        self.identity().is_some()
    }

    /// Key identifying one impression occurrence: the ad id and the request id, with
    /// [`UNKNOWN_REQUEST_ID`] standing in for a missing one.
    pub fn dedup_key(ad: &ResolvedAd, request_id: Option<&str>) -> (String, String) {
        (
            ad.id.clone(),
            request_id.unwrap_or(UNKNOWN_REQUEST_ID).to_owned(),
        )
    }

    /// Report that `ad` was displayed. Only the first call for a given ad and request id sends an
    /// event; later calls return `Ok(())` without touching the network.
    ///
    /// The key is recorded before the event is sent, so an impression whose send fails is not
    /// retried by later calls.
    pub async fn track_impression(&self, ad: &ResolvedAd, request_id: Option<&str>) -> Result<()> {
        let payload = self.payload(EventKind::Impression, ad, request_id)?;

        if !self.mark_impression(Self::dedup_key(ad, request_id)) {
            log::debug!(target: "chat_ads",
                        ad_id = ad.id.as_str(),
                        request_id = payload.request_id.as_str();
                        "impression already tracked");
            return Ok(());
        }

        self.client.send_event(&payload).await
    }

    pub async fn track_click(&self, ad: &ResolvedAd, request_id: Option<&str>) -> Result<()> {
        let payload = self.payload(EventKind::Click, ad, request_id)?;
        self.client.send_event(&payload).await
    }

    /// Report an email submitted through a lead generation ad.
    pub async fn track_submit(
        &self,
        ad: &ResolvedAd,
        request_id: Option<&str>,
        submitted_email: &str,
    ) -> Result<()> {
        let kind = EventKind::Submit {
            submitted_email: submitted_email.to_owned(),
        };
        let payload = self.payload(kind, ad, request_id)?;
        self.client.send_event(&payload).await
    }

    /// Report the option picked on a followup ad.
    pub async fn track_option_tap(
        &self,
        ad: &ResolvedAd,
        request_id: Option<&str>,
        option_id: &str,
    ) -> Result<()> {
        let kind = EventKind::OptionTap {
            option_id: option_id.to_owned(),
        };
        let payload = self.payload(kind, ad, request_id)?;
        self.client.send_event(&payload).await
    }

    fn identity(&self) -> Option<Arc<TrackerIdentity>> {
        let identity = self
            .identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        identity.clone()
    }

    /// Atomically insert `key`, returning `true` if it was not present.
    fn mark_impression(&self, key: (String, String)) -> bool {
        let mut seen = self
            .seen_impressions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.insert(key)
    }

    fn payload(
        &self,
        kind: EventKind,
        ad: &ResolvedAd,
        request_id: Option<&str>,
    ) -> Result<EventPayload> {
        let Some(identity) = self.identity() else {
            log::warn!(target: "chat_ads",
                       ad_id = ad.id.as_str();
                       "tracking an event before the tracker has been initialized");
            return Err(Error::NotInitialized);
        };

        Ok(EventPayload {
            kind,
            ad_id: ad.id.clone(),
            advertiser_id: ad.advertiser_id.clone(),
            request_id: request_id.unwrap_or(UNKNOWN_REQUEST_ID).to_owned(),
            app_id: identity.app_id.clone(),
            conversation_id: identity.conversation_id.clone(),
            user_id: identity.user_id.clone(),
        })
    }
}

/// Detached tracking for UI callbacks that must not wait on the network.
///
/// Each method spawns the matching `track_*` call on the current Tokio runtime and logs a failure
/// instead of returning it. Outside a runtime nothing is sent: a warning is logged and `None` is
/// returned.
impl<T: Transport + 'static> EventTracker<T> {
    pub fn spawn_impression(
        self: &Arc<Self>,
        ad: ResolvedAd,
        request_id: Option<String>,
    ) -> Option<JoinHandle<()>> {
        let tracker = Arc::clone(self);
        spawn_detached("impression", &ad.id.clone(), async move {
            let result = tracker.track_impression(&ad, request_id.as_deref()).await;
            log_failure("impression", &ad, result);
        })
    }

    pub fn spawn_click(
        self: &Arc<Self>,
        ad: ResolvedAd,
        request_id: Option<String>,
    ) -> Option<JoinHandle<()>> {
        let tracker = Arc::clone(self);
        spawn_detached("click", &ad.id.clone(), async move {
            let result = tracker.track_click(&ad, request_id.as_deref()).await;
            log_failure("click", &ad, result);
        })
    }

    pub fn spawn_submit(
        self: &Arc<Self>,
        ad: ResolvedAd,
        request_id: Option<String>,
        submitted_email: String,
    ) -> Option<JoinHandle<()>> {
        let tracker = Arc::clone(self);
        spawn_detached("submit", &ad.id.clone(), async move {
            let result = tracker
                .track_submit(&ad, request_id.as_deref(), &submitted_email)
                .await;
            log_failure("submit", &ad, result);
        })
    }

    pub fn spawn_option_tap(
        self: &Arc<Self>,
        ad: ResolvedAd,
        request_id: Option<String>,
        option_id: String,
    ) -> Option<JoinHandle<()>> {
        let tracker = Arc::clone(self);
        spawn_detached("optionTap", &ad.id.clone(), async move {
            let result = tracker
                .track_option_tap(&ad, request_id.as_deref(), &option_id)
                .await;
            log_failure("optionTap", &ad, result);
        })
    }
}

fn spawn_detached<F>(event_type: &str, ad_id: &str, task: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => Some(handle.spawn(task)),
        Err(err) => {
            log::warn!(target: "chat_ads",
                       event_type,
                       ad_id;
                       "not tracking event outside a Tokio runtime: {}", err);
            None
        }
    }
}

fn log_failure(event_type: &str, ad: &ResolvedAd, result: Result<()>) {
    if let Err(err) = result {
        log::warn!(target: "chat_ads",
                   event_type,
                   ad_id = ad.id.as_str();
                   "failed to track event: {}", err);
    }
}
