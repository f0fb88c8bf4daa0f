//! Ecowitt client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use super::PROVIDER_NAME;
use crate::error::{ProviderError, ProviderResult};

/// Configuration for [`super::EcowittClient`].
///
/// Keys are never printed by the `Debug` impl.
#[derive(Clone)]
pub struct EcowittConfig {
    pub application_key: String,
    pub api_key: String,
    /// API root; the versioned paths are appended to it.
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl EcowittConfig {
    /// Default API root.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.ecowitt.net";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    /// Creates a configuration, rejecting empty keys.
    pub fn new(application_key: impl Into<String>, api_key: impl Into<String>) -> ProviderResult<Self> {
        let application_key = application_key.into().trim().to_string();
        let api_key = api_key.into().trim().to_string();

        if application_key.is_empty() {
            return Err(ProviderError::config_missing("application_key is not set")
                .with_provider(PROVIDER_NAME));
        }
        if api_key.is_empty() {
            return Err(ProviderError::config_missing("api_key is not set").with_provider(PROVIDER_NAME));
        }

        let base_url = Url::parse(Self::DEFAULT_BASE_URL)
            .map_err(|e| ProviderError::config_missing(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            application_key,
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

    /// Full URL for an API path such as `api/v3/device/real_time`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for EcowittConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcowittConfig")
            .field("application_key", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    #[test]
    fn rejects_empty_keys() {
        let err = EcowittConfig::new("", "key").unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::ConfigMissing);
        assert!(err.message().contains("application_key"));

        let err = EcowittConfig::new("app", "   ").unwrap_err();
        assert!(err.message().contains("api_key"));
    }

    #[test]
    fn defaults() {
        let config = EcowittConfig::new("app", "key").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(
            config.endpoint("api/v3/device/real_time"),
            "https://api.ecowitt.net/api/v3/device/real_time"
        );
    }

    #[test]
    fn endpoint_with_custom_base() {
        let config = EcowittConfig::new("app", "key")
            .unwrap()
            .with_base_url(Url::parse("http://127.0.0.1:8080/proxy/").unwrap());
        assert_eq!(
            config.endpoint("/api/v3/device/history"),
            "http://127.0.0.1:8080/proxy/api/v3/device/history"
        );
    }

    #[test]
    fn debug_redacts_keys() {
        let config = EcowittConfig::new("secret-app", "secret-api").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-app"));
        assert!(!debug.contains("secret-api"));
    }
}
