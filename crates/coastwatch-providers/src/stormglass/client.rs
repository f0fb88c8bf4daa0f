//! Stormglass API client.

use coastwatch_core::TideExtreme;
use tracing::{debug, warn};

use super::PROVIDER_NAME;
use super::config::StormglassConfig;
use super::payload::{parse_extremes_body, upstream_errors};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, Coordinates, TideProvider, send_error};

/// Query for `tide/extremes/point`.
pub fn extremes_query(location: Coordinates) -> Vec<(&'static str, String)> {
    vec![
        ("lat", location.latitude.to_string()),
        ("lng", location.longitude.to_string()),
    ]
}

/// Stormglass API client.
#[derive(Debug)]
pub struct StormglassClient {
    http_client: reqwest::Client,
    config: StormglassConfig,
}

impl StormglassClient {
    pub fn new(config: StormglassConfig) -> ProviderResult<Self> {
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

    pub fn config(&self) -> &StormglassConfig {
        &self.config
    }

    /// Fetches tide extremes near `location`.
    pub async fn fetch_extremes(&self, location: Coordinates) -> ProviderResult<Vec<TideExtreme>> {
        debug!(%location, "fetching tide extremes");

        let response = self
            .http_client
            .get(self.config.extremes_url())
            .query(&extremes_query(location))
            .header(reqwest::header::AUTHORIZATION, &self.config.api_key)
            .send()
            .await
            .map_err(|e| send_error(e).with_provider(PROVIDER_NAME))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e.without_url()))
                .with_provider(PROVIDER_NAME)
        })?;

        if !status.is_success() {
            warn!(%status, "stormglass returned an error status");
            let message = upstream_errors(&body).unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ProviderError::upstream_rejected(message).with_provider(PROVIDER_NAME));
        }

        let extremes = parse_extremes_body(&body)?;
        debug!(count = extremes.len(), "parsed tide extremes");
        Ok(extremes)
    }
}

impl TideProvider for StormglassClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_extremes(
        &self,
        location: Coordinates,
    ) -> BoxFuture<'_, ProviderResult<Vec<TideExtreme>>> {
        Box::pin(StormglassClient::fetch_extremes(self, location))
    }
}
