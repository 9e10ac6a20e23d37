//! A thread-safe in-memory storage for the client's configuration state. Every outgoing request
//! is assembled from a single [`Configuration`] snapshot, so a concurrent
//! [`ConfigurationStore::initialize`] can never produce a request mixing old and new values.
use std::sync::{Arc, RwLock};

use semver::Version;

/// Immutable configuration snapshot. Replaced as a whole on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// `None` until [`ConfigurationStore::initialize`] is called.
    pub app_id: Option<String>,
    pub base_url: String,
    pub sdk_version: Version,
}

impl Configuration {
    /// Initialized exactly when an app id is present.
    pub fn is_initialized(&self) -> bool {
        self.app_id.is_some()
    }
}

/// `ConfigurationStore` provides a thread-safe (`Sync`) storage for [`Configuration`] that allows
/// concurrent access for readers and writers.
#[derive(Debug)]
pub struct ConfigurationStore {
    configuration: RwLock<Arc<Configuration>>,
}

impl ConfigurationStore {
    pub fn new(base_url: String, sdk_version: Version) -> Self {
        ConfigurationStore {
            configuration: RwLock::new(Arc::new(Configuration {
                app_id: None,
                base_url,
                sdk_version,
            })),
        }
    }

    /// Get the currently active configuration.
    pub fn snapshot(&self) -> Arc<Configuration> {
        // Writers only ever swap the Arc, so the value behind a poisoned lock is still consistent.
        let configuration = self
            .configuration
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&configuration)
    }

    /// Store `app_id` and, when `base_url` is non-empty, replace the base URL. Returns the new
    /// configuration.
    pub fn initialize(&self, app_id: String, base_url: Option<String>) -> Arc<Configuration> {
        let mut slot = self
            .configuration
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let base_url = base_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| slot.base_url.clone());
        let new_value = Arc::new(Configuration {
            app_id: Some(app_id),
            base_url,
            sdk_version: slot.sdk_version.clone(),
        });

        *slot = Arc::clone(&new_value);
        new_value
    }
}
