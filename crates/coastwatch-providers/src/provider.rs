//! Provider traits.
//!
//! The pipeline only sees [`WeatherProvider`] and [`TideProvider`], so tests
//! and alternative backends can stand in for the HTTP clients.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use coastwatch_core::{DeviceId, TideExtreme};
use serde::{Deserialize, Serialize};

use crate::ecowitt::{HistoricalSeries, RealtimePayload};
use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits object-safe so the pipeline can hold
/// `Arc<dyn WeatherProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `User-Agent` sent by the HTTP clients.
pub(crate) fn default_user_agent() -> String {
    format!("coastwatch/{}", env!("CARGO_PKG_VERSION"))
}

/// Maps a failed `send()` to a provider error.
///
/// A request that could not be built (e.g. a credential that is not a valid
/// header value) is a configuration problem and is not retried.
pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::config_missing(format!("invalid request: {}", e.without_url()))
    } else if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e.without_url()))
    } else {
        ProviderError::network(format!("request failed: {}", e.without_url()))
    }
}

/// A point on the coast, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A source of weather station telemetry.
pub trait WeatherProvider: Send + Sync {
    /// Short lowercase name used in logs and notices.
    fn name(&self) -> &str;

    /// Fetches the station's current readings.
    fn fetch_realtime<'a>(
        &'a self,
        device: &'a DeviceId,
    ) -> BoxFuture<'a, ProviderResult<RealtimePayload>>;

    /// Fetches the trailing `lookback_days` of history.
    fn fetch_historical<'a>(
        &'a self,
        device: &'a DeviceId,
        lookback_days: u32,
    ) -> BoxFuture<'a, ProviderResult<HistoricalSeries>>;
}

/// A source of tide predictions.
pub trait TideProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches upcoming high and low waters near `location`.
    fn fetch_extremes(
        &self,
        location: Coordinates,
    ) -> BoxFuture<'_, ProviderResult<Vec<TideExtreme>>>;
}

/// Stands in for a provider whose credentials were not supplied.
///
/// Every call fails with a `ConfigMissing` error, so the affected dashboard
/// section shows a configuration notice while the other sections render.
#[derive(Debug, Clone)]
pub struct UnconfiguredProvider {
    name: String,
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::config_missing(self.reason.clone()).with_provider(self.name.clone())
    }
}

impl WeatherProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_realtime<'a>(
        &'a self,
        _device: &'a DeviceId,
    ) -> BoxFuture<'a, ProviderResult<RealtimePayload>> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }

    fn fetch_historical<'a>(
        &'a self,
        _device: &'a DeviceId,
        _lookback_days: u32,
    ) -> BoxFuture<'a, ProviderResult<HistoricalSeries>> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }
}

impl TideProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_extremes(
        &self,
        _location: Coordinates,
    ) -> BoxFuture<'_, ProviderResult<Vec<TideExtreme>>> {
        let err = self.error();
        Box::pin(async move { Err(err) })
    }
}
