//! Client settings, loadable from any serde source.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::client::ENDPOINT_URL;
use crate::error::{ConsentError, Result};

#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Private API key issued for the consent service.
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    ENDPOINT_URL.to_string()
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }

    /// Read a config from an already-parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConsentError::Config(e.to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
