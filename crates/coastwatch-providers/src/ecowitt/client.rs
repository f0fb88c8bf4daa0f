//! Ecowitt API client.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use coastwatch_core::DeviceId;
use tracing::{debug, warn};

use super::PROVIDER_NAME;
use super::config::EcowittConfig;
use super::payload::{HistoricalSeries, RealtimePayload, parse_history_body, parse_realtime_body};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, WeatherProvider, send_error};

const REALTIME_PATH: &str = "api/v3/device/real_time";
const HISTORY_PATH: &str = "api/v3/device/history";

/// Sampling interval requested for history.
pub const HISTORY_CYCLE: &str = "30min";

/// Request every reading in the units the normalizer expects.
const UNIT_PARAMS: [(&str, &str); 5] = [
    ("temp_unitid", "1"),
    ("pressure_unitid", "3"),
    ("wind_speed_unitid", "7"),
    ("rainfall_unitid", "12"),
    ("solar_irradiance_unitid", "16"),
];

/// Upstream bodies quoted in errors are cut to this many characters.
const MAX_BODY_EXCERPT: usize = 200;

/// Query for `device/real_time`.
pub fn realtime_query(config: &EcowittConfig, device: &DeviceId) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("application_key", config.application_key.clone()),
        ("api_key", config.api_key.clone()),
        ("mac", device.wire_form()),
        ("call_back", "all".to_string()),
    ];
    query.extend(UNIT_PARAMS.iter().map(|(k, v)| (*k, v.to_string())));
    query
}

/// Query for `device/history` covering `[start, end]`.
pub fn history_query(
    config: &EcowittConfig,
    device: &DeviceId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    let mut query = realtime_query(config, device);
    query.push(("start_date", start.format("%Y-%m-%d %H:%M:%S").to_string()));
    query.push(("end_date", end.format("%Y-%m-%d %H:%M:%S").to_string()));
    query.push(("cycle_type", HISTORY_CYCLE.to_string()));
    query
}

/// Ecowitt API client.
#[derive(Debug)]
pub struct EcowittClient {
    http_client: reqwest::Client,
    config: EcowittConfig,
}

impl EcowittClient {
    pub fn new(config: EcowittConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::config_missing(format!("failed to create HTTP client: {}", e))
                    .with_provider(PROVIDER_NAME)
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &EcowittConfig {
        &self.config
    }

    /// Fetches the station's current readings.
    pub async fn fetch_realtime(&self, device: &DeviceId) -> ProviderResult<RealtimePayload> {
        debug!(device = %device.wire_form(), "fetching realtime readings");
        let body = self
            .get(REALTIME_PATH, &realtime_query(&self.config, device))
            .await?;
        parse_realtime_body(&body)
    }

    /// Fetches the trailing `lookback_days` of history, ending now.
    pub async fn fetch_historical(
        &self,
        device: &DeviceId,
        lookback_days: u32,
    ) -> ProviderResult<HistoricalSeries> {
        let end = Utc::now();
        let start = ChronoDuration::try_days(i64::from(lookback_days))
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                ProviderError::config_missing(format!(
                    "history lookback of {} days is out of range",
                    lookback_days
                ))
                .with_provider(PROVIDER_NAME)
            })?;
        debug!(
            device = %device.wire_form(),
            lookback_days,
            cycle = HISTORY_CYCLE,
            "fetching history"
        );
        let body = self
            .get(HISTORY_PATH, &history_query(&self.config, device, start, end))
            .await?;
        let series = parse_history_body(&body)?;
        debug!(metrics = series.metrics.len(), "parsed history");
        Ok(series)
    }

    async fn get(&self, path: &str, query: &[(&'static str, String)]) -> ProviderResult<String> {
        let url = self.config.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| send_error(e).with_provider(PROVIDER_NAME))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e.without_url()))
                .with_provider(PROVIDER_NAME)
        })?;

        if !status.is_success() {
            warn!(path, %status, "ecowitt returned an error status");
            let excerpt: String = body.chars().take(MAX_BODY_EXCERPT).collect();
            return Err(ProviderError::upstream_rejected(format!(
                "HTTP {}: {}",
                status,
                excerpt.trim()
            ))
            .with_provider(PROVIDER_NAME));
        }

        Ok(body)
    }
}

impl WeatherProvider for EcowittClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_realtime<'a>(
        &'a self,
        device: &'a DeviceId,
    ) -> BoxFuture<'a, ProviderResult<RealtimePayload>> {
        Box::pin(EcowittClient::fetch_realtime(self, device))
    }

    fn fetch_historical<'a>(
        &'a self,
        device: &'a DeviceId,
        lookback_days: u32,
    ) -> BoxFuture<'a, ProviderResult<HistoricalSeries>> {
        Box::pin(EcowittClient::fetch_historical(self, device, lookback_days))
    }
}
