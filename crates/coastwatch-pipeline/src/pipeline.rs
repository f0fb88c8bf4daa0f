//! The fetch, cache and normalize orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coastwatch_core::{DeviceId, HistoryReport, TideExtreme, TideFilter, TideWindow, WeatherReport};
use coastwatch_providers::ecowitt::{HistoricalSeries, RealtimePayload};
use coastwatch_providers::{
    Coordinates, ProviderError, ProviderErrorKind, ProviderResult, Severity, TideProvider,
    WeatherProvider, filter_tide_window, normalize_history, normalize_realtime,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::config::PipelineConfig;
use crate::key::{historical_key, tide_key, weather_key};

/// Which weather view to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Current conditions.
    #[default]
    Realtime,
    /// Trailing history series.
    Historical,
}

/// A weather view in either mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "report", rename_all = "snake_case")]
pub enum WeatherView {
    Realtime(WeatherReport),
    Historical(HistoryReport),
}

/// Display-ready description of a failed section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionNotice {
    pub kind: ProviderErrorKind,
    pub severity: Severity,
    pub provider: Option<String>,
    pub message: String,
}

impl From<&ProviderError> for SectionNotice {
    fn from(err: &ProviderError) -> Self {
        Self {
            kind: err.kind(),
            severity: err.severity(),
            provider: err.provider().map(String::from),
            message: err.notice(),
        }
    }
}

/// One dashboard section: either its view or a notice explaining its absence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    Failed(SectionNotice),
}

impl<T> From<ProviderResult<T>> for Section<T> {
    fn from(result: ProviderResult<T>) -> Self {
        match result {
            Ok(view) => Self::Ready(view),
            Err(err) => Self::Failed(SectionNotice::from(&err)),
        }
    }
}

/// Options for [`Pipeline::dashboard`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardOptions {
    pub mode: ViewMode,
    /// Overrides the configured tide filter.
    pub tide_filter: Option<TideFilter>,
}

/// Weather and tides side by side. Each section fails independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub weather: Section<WeatherView>,
    pub tides: Section<TideWindow>,
}

/// Runs provider fetches through the cache and normalizes the results.
pub struct Pipeline {
    config: PipelineConfig,
    weather: Arc<dyn WeatherProvider>,
    tides: Arc<dyn TideProvider>,
    realtime_cache: TtlCache<RealtimePayload>,
    history_cache: TtlCache<HistoricalSeries>,
    tide_cache: TtlCache<Vec<TideExtreme>>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        weather: Arc<dyn WeatherProvider>,
        tides: Arc<dyn TideProvider>,
    ) -> Self {
        Self {
            config,
            weather,
            tides,
            realtime_cache: TtlCache::new(),
            history_cache: TtlCache::new(),
            tide_cache: TtlCache::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn device(&self) -> ProviderResult<DeviceId> {
        let raw = self.config.device.as_deref().ok_or_else(|| {
            ProviderError::config_missing("device identifier is not set")
                .with_provider(self.weather.name())
        })?;
        DeviceId::parse(raw).map_err(|e| ProviderError::from(e).with_provider(self.weather.name()))
    }

    fn location(&self) -> ProviderResult<Coordinates> {
        self.config.location.ok_or_else(|| {
            ProviderError::config_missing("latitude and longitude are not set")
                .with_provider(self.tides.name())
        })
    }

    /// Builds the weather view for `mode`.
    pub async fn weather(&self, mode: ViewMode) -> ProviderResult<WeatherView> {
        match mode {
            ViewMode::Realtime => self.realtime().await.map(WeatherView::Realtime),
            ViewMode::Historical => self.history().await.map(WeatherView::Historical),
        }
    }

    /// Current conditions at the station.
    pub async fn realtime(&self) -> ProviderResult<WeatherReport> {
        let device = self.device()?;
        let key = weather_key(&device);

        let payload = self
            .realtime_cache
            .get_or_compute(&key, self.config.realtime_ttl, || {
                self.weather.fetch_realtime(&device)
            })
            .await?;

        Ok(normalize_realtime(&payload))
    }

    /// Trailing history over the configured lookback.
    pub async fn history(&self) -> ProviderResult<HistoryReport> {
        let device = self.device()?;
        let lookback_days = self.config.history_lookback_days;
        let key = historical_key(&device, lookback_days);

        let series = self
            .history_cache
            .get_or_compute(&key, self.config.history_ttl, || {
                self.weather.fetch_historical(&device, lookback_days)
            })
            .await?;

        Ok(normalize_history(&series, lookback_days))
    }

    /// Tide extremes from now over the configured horizon.
    pub async fn tides(&self, filter: TideFilter) -> ProviderResult<TideWindow> {
        self.tides_at(filter, Utc::now()).await
    }

    /// Like [`Pipeline::tides`], with the window starting at `now`.
    pub async fn tides_at(&self, filter: TideFilter, now: DateTime<Utc>) -> ProviderResult<TideWindow> {
        let location = self.location()?;
        let key = tide_key(location);

        let extremes = self
            .tide_cache
            .get_or_compute(&key, self.config.tide_ttl, || {
                self.tides.fetch_extremes(location)
            })
            .await?;

        let window = filter_tide_window(
            &extremes,
            now,
            self.config.tide_horizon,
            filter,
            self.config.timezone,
        );
        debug!(
            fetched = extremes.len(),
            shown = window.len(),
            "filtered tide window"
        );
        Ok(window)
    }

    /// Builds both sections concurrently.
    ///
    /// Never fails as a whole: a section whose fetch failed carries a notice.
    pub async fn dashboard(&self, options: DashboardOptions) -> Dashboard {
        let filter = options.tide_filter.unwrap_or(self.config.tide_filter);
        let (weather, tides) = tokio::join!(self.weather(options.mode), self.tides(filter));

        if let Err(ref err) = weather {
            warn!(error = %err, "weather section unavailable");
        }
        if let Err(ref err) = tides {
            warn!(error = %err, "tide section unavailable");
        }

        Dashboard {
            weather: weather.into(),
            tides: tides.into(),
        }
    }
}
