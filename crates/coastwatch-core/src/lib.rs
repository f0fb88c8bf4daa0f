//! Core types: device identifiers, unit conversions, tide windows, view models

pub mod device;
pub mod logging;
pub mod tide;
pub mod units;
pub mod view;

pub use device::{DeviceId, DeviceIdError};
pub use logging::{LogFormat, LoggingConfig, LoggingError, init_logging};
pub use tide::{
    LocalTideExtreme, ReferenceTimezone, TideExtreme, TideFilter, TideKind, TideWindow,
    TimezoneError,
};
pub use units::{
    CompassPoint, PressureTrend, RoseSector, compass_bucket, convert_kmh_to_ms, kmh_to_ms,
    parse_numeric, pressure_trend, pressure_trend_text, wind_rose_sector,
};
pub use view::{
    ChartMetric, HistoryReport, LightningView, MetricSeries, OutdoorView, PressureView,
    RainfallView, SolarView, WeatherReport, WindView,
};
