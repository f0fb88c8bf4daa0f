//! Ecowitt weather station provider.
//!
//! Talks to the Ecowitt cloud API v3. Realtime readings come from
//! `device/real_time`, trailing history from `device/history`. Units are
//! pinned in every request (°C, hPa, km/h, mm, W/m²) so the normalizer never
//! has to guess.
//!
//! # Example
//!
//! ```ignore
//! use coastwatch_core::DeviceId;
//! use coastwatch_providers::ecowitt::{EcowittClient, EcowittConfig};
//!
//! let config = EcowittConfig::new("app-key", "api-key")?;
//! let client = EcowittClient::new(config)?;
//! let device = DeviceId::parse("AA:BB:CC:DD:EE:FF")?;
//! let payload = client.fetch_realtime(&device).await?;
//! ```

mod client;
mod config;
mod payload;

pub use client::{EcowittClient, HISTORY_CYCLE, history_query, realtime_query};
pub use config::EcowittConfig;
pub use payload::{
    HistoricalSeries, HistorySample, LightningSection, Metric, OutdoorSection, PressureSection,
    RainfallSection, RealtimeData, RealtimePayload, SolarSection, WindSection,
    parse_history_body, parse_realtime_body,
};

/// Provider name used in logs and errors.
pub const PROVIDER_NAME: &str = "ecowitt";
