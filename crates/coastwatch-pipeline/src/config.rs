//! Pipeline configuration.

use std::time::Duration;

use chrono::TimeDelta;
use coastwatch_core::{ReferenceTimezone, TideFilter};
use coastwatch_providers::{Coordinates, ProviderError, ProviderResult};

use crate::cache::MAX_TTL;

/// What the pipeline fetches, and how long results stay cached.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Station identifier as configured. Validated on every weather request.
    pub device: Option<String>,
    /// Where tide predictions are fetched for.
    pub location: Option<Coordinates>,
    pub realtime_ttl: Duration,
    pub history_ttl: Duration,
    pub tide_ttl: Duration,
    pub history_lookback_days: u32,
    /// Length of the tide window starting now.
    pub tide_horizon: TimeDelta,
    /// Extremes shown when the caller does not ask otherwise.
    pub tide_filter: TideFilter,
    pub timezone: ReferenceTimezone,
}

impl PipelineConfig {
    pub const DEFAULT_REALTIME_TTL_SECS: u64 = 10 * 60;
    pub const DEFAULT_HISTORY_TTL_SECS: u64 = 6 * 60 * 60;
    pub const DEFAULT_TIDE_TTL_SECS: u64 = 24 * 60 * 60;
    pub const DEFAULT_HISTORY_LOOKBACK_DAYS: u32 = 7;
    pub const DEFAULT_TIDE_HORIZON_HOURS: i64 = 48;
    pub const MAX_HISTORY_LOOKBACK_DAYS: u32 = 366;
    pub const MAX_TIDE_HORIZON_HOURS: i64 = 30 * 24;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_realtime_ttl(mut self, ttl: Duration) -> Self {
        self.realtime_ttl = ttl;
        self
    }

    pub fn with_history_ttl(mut self, ttl: Duration) -> Self {
        self.history_ttl = ttl;
        self
    }

    pub fn with_tide_ttl(mut self, ttl: Duration) -> Self {
        self.tide_ttl = ttl;
        self
    }

    pub fn with_history_lookback_days(mut self, days: u32) -> Self {
        self.history_lookback_days = days;
        self
    }

    pub fn with_tide_horizon(mut self, horizon: TimeDelta) -> Self {
        self.tide_horizon = horizon;
        self
    }

    pub fn with_tide_filter(mut self, filter: TideFilter) -> Self {
        self.tide_filter = filter;
        self
    }

    pub fn with_timezone(mut self, timezone: ReferenceTimezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Checks the window and TTL settings are in range.
    ///
    /// Errors are [`ConfigMissing`](coastwatch_providers::ProviderErrorKind::ConfigMissing),
    /// attributed to the `display` or `cache` section they come from.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.tide_horizon <= TimeDelta::zero()
            || self.tide_horizon > TimeDelta::hours(Self::MAX_TIDE_HORIZON_HOURS)
        {
            return Err(ProviderError::config_missing(format!(
                "tide horizon must be between 1 and {} hours",
                Self::MAX_TIDE_HORIZON_HOURS
            ))
            .with_provider("display"));
        }

        if !(1..=Self::MAX_HISTORY_LOOKBACK_DAYS).contains(&self.history_lookback_days) {
            return Err(ProviderError::config_missing(format!(
                "history lookback must be between 1 and {} days",
                Self::MAX_HISTORY_LOOKBACK_DAYS
            ))
            .with_provider("cache"));
        }

        for (name, ttl) in [
            ("realtime", self.realtime_ttl),
            ("history", self.history_ttl),
            ("tide", self.tide_ttl),
        ] {
            if ttl > MAX_TTL {
                return Err(ProviderError::config_missing(format!(
                    "{} TTL must not exceed {} seconds",
                    name,
                    MAX_TTL.as_secs()
                ))
                .with_provider("cache"));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device: None,
            location: None,
            realtime_ttl: Duration::from_secs(Self::DEFAULT_REALTIME_TTL_SECS),
            history_ttl: Duration::from_secs(Self::DEFAULT_HISTORY_TTL_SECS),
            tide_ttl: Duration::from_secs(Self::DEFAULT_TIDE_TTL_SECS),
            history_lookback_days: Self::DEFAULT_HISTORY_LOOKBACK_DAYS,
            tide_horizon: TimeDelta::hours(Self::DEFAULT_TIDE_HORIZON_HOURS),
            tide_filter: TideFilter::High,
            timezone: ReferenceTimezone::Local,
        }
    }
}
