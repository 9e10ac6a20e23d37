//! Client SDK for contextual ads in chat applications.
//!
//! # Overview
//!
//! The SDK revolves around a [`Client`] that requests an ad matching a piece of conversation text
//! and reports engagement events (impressions, clicks, lead form submits, followup option taps)
//! back to the ads backend. An [`EventTracker`] wraps the client and makes sure each impression is
//! reported at most once per ad and request.
//!
//! Most applications should use [`AdSdk`], which owns both and validates the app id:
//!
//! ```no_run
//! # async fn run() -> chat_ads::Result<()> {
//! use chat_ads::{AdRequest, AdSdk, ClientConfig};
//!
//! let sdk = AdSdk::new(ClientConfig::new());
//! sdk.initialize("app-1", None)?;
//!
//! let result = sdk
//!     .request_ad(&AdRequest::new("c1", "m1", "learning english vocabulary"))
//!     .await?;
//! match result.ad {
//!     Some(ad) => sdk.tracker().track_impression(&ad, result.request_id.as_deref()).await?,
//!     // No ad matched. This is not an error.
//!     None => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Ad formats
//!
//! Every [`ResolvedAd`] has exactly one [`AdFormat`]. Format-specific configuration is only
//! reachable through the accessor matching the ad's format, and falls back to documented defaults
//! when the backend omits it.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Nothing is retried: each failure is returned once
//! to the caller.
//!
//! Tracking failures are usually not worth surfacing to the user. The `spawn_*` methods on
//! [`EventTracker`] run tracking in the background and only log failures.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging messages, under
//! the `chat_ads` target. Consider integrating a `log`-compatible logger implementation for better
//! visibility into SDK operations.

#![warn(rustdoc::missing_crate_level_docs)]

mod ad;
mod client;
mod config;
mod configuration_store;
mod error;
mod payload;
mod sdk;
mod tracker;
mod transport;

pub use ad::{
    AdFormat, ChatMessage, FollowupConfig, FollowupOption, FormatConfig, LeadGenConfig,
    ResolvedAd, StaticAdConfig,
};
pub use client::Client;
pub use config::ClientConfig;
pub use configuration_store::Configuration;
pub use error::{Error, Result, NO_RESPONSE_STATUS};
pub use payload::{
    AdRequest, AdResponse, AdResult, EventKind, EventPayload, EventType, RequestPayload,
};
pub use sdk::AdSdk;
pub use tracker::{EventTracker, UNKNOWN_REQUEST_ID};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
