//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/coastwatch/config.toml` by default.
//!
//! Credential values (`application_key`, `api_key`) support secret references:
//! - `env::VAR_NAME` resolved from the environment
//! - `file::/path` resolved from the first line of a file
//! - plain text used as-is
//!
//! A missing `[ecowitt]` or `[stormglass]` section is not a load error. The
//! matching dashboard section reports a configuration notice instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use coastwatch_core::{ReferenceTimezone, TideFilter};
use coastwatch_pipeline::{Pipeline, PipelineConfig};
use coastwatch_providers::ecowitt::{self, EcowittClient, EcowittConfig};
use coastwatch_providers::stormglass::{self, StormglassClient, StormglassConfig};
use coastwatch_providers::{
    Coordinates, ProviderError, ProviderResult, TideProvider, UnconfiguredProvider,
    WeatherProvider,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Placeholder written over literal credentials by [`AppConfig::redacted`].
const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// AppConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the coastwatch client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Weather station settings.
    pub ecowitt: Option<EcowittSettings>,

    /// Tide prediction settings.
    pub stormglass: Option<StormglassSettings>,

    pub display: DisplaySettings,

    pub cache: CacheSettings,

    pub http: HttpSettings,
}

/// Ecowitt station settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcowittSettings {
    /// Application key (supports `env::` and `file::` prefixes).
    pub application_key: Option<String>,

    /// API key (supports `env::` and `file::` prefixes).
    pub api_key: Option<String>,

    /// Station MAC address or IMEI.
    pub mac: Option<String>,

    /// Overrides the API root.
    pub base_url: Option<String>,
}

/// Stormglass tide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StormglassSettings {
    /// API key (supports `env::` and `file::` prefixes).
    pub api_key: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Overrides the API root.
    pub base_url: Option<String>,
}

/// How results are presented.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// `local`, `UTC`, a fixed offset such as `+01:00` or a zone name such
    /// as `Europe/London`.
    pub timezone: ReferenceTimezone,

    /// `high` or `all`.
    pub tide_types: TideFilter,

    /// Length of the tide window.
    pub tide_horizon_hours: i64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: ReferenceTimezone::Local,
            tide_types: TideFilter::High,
            tide_horizon_hours: PipelineConfig::DEFAULT_TIDE_HORIZON_HOURS,
        }
    }
}

/// Cache lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub realtime_ttl_secs: u64,
    pub history_ttl_secs: u64,
    pub tide_ttl_secs: u64,
    pub history_lookback_days: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            realtime_ttl_secs: PipelineConfig::DEFAULT_REALTIME_TTL_SECS,
            history_ttl_secs: PipelineConfig::DEFAULT_HISTORY_TTL_SECS,
            tide_ttl_secs: PipelineConfig::DEFAULT_TIDE_TTL_SECS,
            history_lookback_days: PipelineConfig::DEFAULT_HISTORY_LOOKBACK_DAYS,
        }
    }
}

/// HTTP settings shared by both providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: EcowittConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coastwatch")
    }

    /// Builds the pipeline settings. Credentials are not part of them.
    ///
    /// Window and TTL values outside the supported range are a
    /// configuration error.
    pub fn pipeline_config(&self) -> ProviderResult<PipelineConfig> {
        let tide_horizon = TimeDelta::try_hours(self.display.tide_horizon_hours).ok_or_else(|| {
            ProviderError::config_missing("tide_horizon_hours is out of range")
                .with_provider("display")
        })?;

        let mut config = PipelineConfig::new()
            .with_realtime_ttl(Duration::from_secs(self.cache.realtime_ttl_secs))
            .with_history_ttl(Duration::from_secs(self.cache.history_ttl_secs))
            .with_tide_ttl(Duration::from_secs(self.cache.tide_ttl_secs))
            .with_history_lookback_days(self.cache.history_lookback_days)
            .with_tide_horizon(tide_horizon)
            .with_tide_filter(self.display.tide_types)
            .with_timezone(self.display.timezone);

        if let Some(mac) = self.ecowitt.as_ref().and_then(|s| s.mac.as_deref()) {
            config = config.with_device(mac);
        }
        if let Some(location) = self.stormglass.as_ref().and_then(StormglassSettings::location) {
            config = config.with_location(location);
        }
        config.validate()?;
        Ok(config)
    }

    /// Builds the Ecowitt client from the `[ecowitt]` section.
    pub fn ecowitt_client(&self) -> ProviderResult<EcowittClient> {
        let settings = self.ecowitt.as_ref().ok_or_else(|| {
            ProviderError::config_missing("add an [ecowitt] section to config.toml")
                .with_provider(ecowitt::PROVIDER_NAME)
        })?;
        EcowittClient::new(settings.to_provider_config(&self.http)?)
    }

    /// Builds the Stormglass client from the `[stormglass]` section.
    pub fn stormglass_client(&self) -> ProviderResult<StormglassClient> {
        let settings = self.stormglass.as_ref().ok_or_else(|| {
            ProviderError::config_missing("add a [stormglass] section to config.toml")
                .with_provider(stormglass::PROVIDER_NAME)
        })?;
        StormglassClient::new(settings.to_provider_config(&self.http)?)
    }

    /// The weather provider, or a stand-in that reports why it is unavailable.
    pub fn weather_provider(&self) -> Arc<dyn WeatherProvider> {
        match self.ecowitt_client() {
            Ok(client) => Arc::new(client),
            Err(e) => {
                debug!(error = %e, "weather provider unavailable");
                Arc::new(UnconfiguredProvider::new(ecowitt::PROVIDER_NAME, e.message()))
            }
        }
    }

    /// The tide provider, or a stand-in that reports why it is unavailable.
    pub fn tide_provider(&self) -> Arc<dyn TideProvider> {
        match self.stormglass_client() {
            Ok(client) => Arc::new(client),
            Err(e) => {
                debug!(error = %e, "tide provider unavailable");
                Arc::new(UnconfiguredProvider::new(stormglass::PROVIDER_NAME, e.message()))
            }
        }
    }

    /// Wires providers and settings into a pipeline.
    pub fn pipeline(&self) -> ProviderResult<Pipeline> {
        Ok(Pipeline::new(
            self.pipeline_config()?,
            self.weather_provider(),
            self.tide_provider(),
        ))
    }

    /// A copy with literal credentials masked. Secret references are kept.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref mut settings) = config.ecowitt {
            redact(&mut settings.application_key);
            redact(&mut settings.api_key);
        }
        if let Some(ref mut settings) = config.stormglass {
            redact(&mut settings.api_key);
        }
        config
    }
}

fn redact(value: &mut Option<String>) {
    if let Some(v) = value {
        if !secret::is_reference(v) {
            *v = REDACTED.to_string();
        }
    }
}

/// Resolves a credential, treating absent and blank values alike.
fn resolve_credential(
    provider: &'static str,
    section: &str,
    field: &str,
    raw: Option<&str>,
) -> ProviderResult<String> {
    let raw = raw.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        ProviderError::config_missing(format!("{} is missing from [{}]", field, section))
            .with_provider(provider)
    })?;
    secret::resolve(raw).map_err(|e| {
        ProviderError::config_missing(format!("failed to resolve {}: {}", field, e))
            .with_provider(provider)
            .with_source(e)
    })
}

fn parse_base_url(provider: &'static str, raw: &str) -> ProviderResult<Url> {
    Url::parse(raw).map_err(|e| {
        ProviderError::config_missing(format!("invalid base_url {:?}: {}", raw, e))
            .with_provider(provider)
            .with_source(e)
    })
}

impl EcowittSettings {
    /// Converts to provider configuration, resolving secret references.
    pub fn to_provider_config(&self, http: &HttpSettings) -> ProviderResult<EcowittConfig> {
        let name = ecowitt::PROVIDER_NAME;
        let application_key = resolve_credential(
            name,
            "ecowitt",
            "application_key",
            self.application_key.as_deref(),
        )?;
        let api_key = resolve_credential(name, "ecowitt", "api_key", self.api_key.as_deref())?;

        let mut config = EcowittConfig::new(application_key, api_key)?.with_timeout(http.timeout());
        if let Some(ref raw) = self.base_url {
            config = config.with_base_url(parse_base_url(name, raw)?);
        }
        Ok(config)
    }
}

impl StormglassSettings {
    /// Converts to provider configuration, resolving secret references.
    pub fn to_provider_config(&self, http: &HttpSettings) -> ProviderResult<StormglassConfig> {
        let name = stormglass::PROVIDER_NAME;
        let api_key = resolve_credential(name, "stormglass", "api_key", self.api_key.as_deref())?;

        let mut config = StormglassConfig::new(api_key)?.with_timeout(http.timeout());
        if let Some(ref raw) = self.base_url {
            config = config.with_base_url(parse_base_url(name, raw)?);
        }
        Ok(config)
    }

    /// The configured location, when both coordinates are present.
    pub fn location(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}
