//! Fetch, cache and normalize.
//!
//! [`Pipeline`] computes a cache key from the request-identifying
//! parameters, asks the [`TtlCache`] for the payload (fetching through a
//! provider on a miss), then normalizes the payload into a view model.
//! Failed fetches are never cached.

pub mod cache;
pub mod config;
pub mod key;
pub mod pipeline;

pub use cache::{CacheEntry, TtlCache};
pub use config::PipelineConfig;
pub use key::{historical_key, tide_key, weather_key};
pub use pipeline::{Dashboard, DashboardOptions, Pipeline, Section, SectionNotice, ViewMode, WeatherView};
