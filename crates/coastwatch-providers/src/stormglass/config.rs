//! Stormglass client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use super::PROVIDER_NAME;
use crate::error::{ProviderError, ProviderResult};

/// Configuration for [`super::StormglassClient`].
#[derive(Clone)]
pub struct StormglassConfig {
    pub api_key: String,
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl StormglassConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.stormglass.io";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    /// Creates a configuration, rejecting an empty key.
    pub fn new(api_key: impl Into<String>) -> ProviderResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ProviderError::config_missing("api_key is not set").with_provider(PROVIDER_NAME));
        }

        let base_url = Url::parse(Self::DEFAULT_BASE_URL)
            .map_err(|e| ProviderError::config_missing(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: crate::provider::default_user_agent(),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the tide extremes endpoint.
    pub fn extremes_url(&self) -> String {
        format!(
            "{}/v2/tide/extremes/point",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

impl fmt::Debug for StormglassConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StormglassConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
