//! Provider clients and the normalization pipeline.
//!
//! - [`WeatherProvider`] / [`TideProvider`] - the seams the pipeline fetches through
//! - [`ecowitt`] - weather station telemetry (realtime and history)
//! - [`stormglass`] - tide extreme predictions
//! - [`normalize`] - raw payloads to display-ready view models
//! - [`ProviderError`] - the error taxonomy shared by both providers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │  Ecowitt API    │    │  Stormglass API  │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌──────────────────┐
//! │  EcowittClient  │    │ StormglassClient │
//! └────────┬────────┘    └────────┬─────────┘
//!          │ RealtimePayload      │ Vec<TideExtreme>
//!          │ HistoricalSeries     │
//!          └──────────┬───────────┘
//!                     ▼ normalize
//!     WeatherReport / HistoryReport / TideWindow
//! ```

pub mod ecowitt;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod stormglass;

pub use error::{ProviderError, ProviderErrorKind, ProviderResult, Severity};
pub use normalize::{filter_tide_window, normalize_history, normalize_realtime};
pub use provider::{
    BoxFuture, Coordinates, TideProvider, UnconfiguredProvider, WeatherProvider,
};
