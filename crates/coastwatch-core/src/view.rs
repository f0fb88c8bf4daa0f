//! Display-ready view models.
//!
//! These are what the presentation layer consumes. Every section and reading
//! is optional: a sensor the station does not report stays `None` all the way
//! through to the renderer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::units::{CompassPoint, PressureTrend, RoseSector};

/// Current conditions at the station.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherReport {
    /// When the station last reported, if the upstream said so.
    pub captured_at: Option<DateTime<Utc>>,
    pub outdoor: Option<OutdoorView>,
    pub wind: Option<WindView>,
    pub rainfall: Option<RainfallView>,
    pub pressure: Option<PressureView>,
    pub solar: Option<SolarView>,
    pub lightning: Option<LightningView>,
    /// Soil moisture percentage keyed by sensor channel (1-based).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub soil_moisture_pct: BTreeMap<u8, f64>,
}

impl WeatherReport {
    /// True when the station reported nothing we know how to show.
    pub fn is_empty(&self) -> bool {
        self.outdoor.is_none()
            && self.wind.is_none()
            && self.rainfall.is_none()
            && self.pressure.is_none()
            && self.solar.is_none()
            && self.lightning.is_none()
            && self.soil_moisture_pct.is_empty()
    }
}

/// Outdoor temperature and humidity, in °C and %.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutdoorView {
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub dew_point_c: Option<f64>,
}

/// Wind speeds are one-decimal m/s strings; missing speeds read `"0.0"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindView {
    pub speed_ms: String,
    pub gust_ms: String,
    pub direction_deg: Option<f64>,
    pub compass: Option<CompassPoint>,
    pub rose_sector: Option<RoseSector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RainfallView {
    pub rate_mm_h: Option<f64>,
    pub daily_mm: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PressureView {
    pub absolute_hpa: Option<f64>,
    pub trend: Option<PressureTrend>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolarView {
    pub radiation_w_m2: Option<f64>,
    pub uv_index: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LightningView {
    pub count: Option<f64>,
    pub distance_km: Option<f64>,
}

/// The series offered on the history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    OutdoorTemperature,
    OutdoorHumidity,
    RainfallRainRate,
    WindSpeed,
    SolarAndUviSolar,
    SolarAndUviUvi,
    PressureAbsolute,
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 7] = [
        Self::OutdoorTemperature,
        Self::OutdoorHumidity,
        Self::RainfallRainRate,
        Self::WindSpeed,
        Self::SolarAndUviSolar,
        Self::SolarAndUviUvi,
        Self::PressureAbsolute,
    ];

    /// The upstream `(section, metric)` pair this series is read from.
    pub fn source(&self) -> (&'static str, &'static str) {
        match self {
            Self::OutdoorTemperature => ("outdoor", "temperature"),
            Self::OutdoorHumidity => ("outdoor", "humidity"),
            Self::RainfallRainRate => ("rainfall", "rain_rate"),
            Self::WindSpeed => ("wind", "wind_speed"),
            Self::SolarAndUviSolar => ("solar_and_uvi", "solar"),
            Self::SolarAndUviUvi => ("solar_and_uvi", "uvi"),
            Self::PressureAbsolute => ("pressure", "absolute"),
        }
    }

    /// Key used in [`crate::view::HistoryReport`] and on the wire, e.g. `outdoor.temperature`.
    pub fn key(&self) -> String {
        let (section, metric) = self.source();
        format!("{}.{}", section, metric)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::OutdoorTemperature => "Outdoor Temperature",
            Self::OutdoorHumidity => "Outdoor Humidity",
            Self::RainfallRainRate => "Rain Rate",
            Self::WindSpeed => "Wind Speed",
            Self::SolarAndUviSolar => "Solar Radiation",
            Self::SolarAndUviUvi => "UV Index",
            Self::PressureAbsolute => "Absolute Pressure",
        }
    }

    pub fn axis_title(&self) -> &'static str {
        match self {
            Self::OutdoorTemperature => "Temperature (°C)",
            Self::OutdoorHumidity => "Humidity (%)",
            Self::RainfallRainRate => "Rain Rate (mm/h)",
            Self::WindSpeed => "Wind Speed (m/s)",
            Self::SolarAndUviSolar => "Solar (W/m²)",
            Self::SolarAndUviUvi => "UVI",
            Self::PressureAbsolute => "Pressure (hPa)",
        }
    }

    /// Suffix appended to values in tooltips. Empty for dimensionless series.
    pub fn unit_suffix(&self) -> &'static str {
        match self {
            Self::OutdoorTemperature => " °C",
            Self::OutdoorHumidity => " %",
            Self::RainfallRainRate => " mm/h",
            Self::WindSpeed => " m/s",
            Self::SolarAndUviSolar => " W/m²",
            Self::SolarAndUviUvi => "",
            Self::PressureAbsolute => " hPa",
        }
    }
}

impl fmt::Display for ChartMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One chartable series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    pub metric: ChartMetric,
    pub title: String,
    pub axis_title: String,
    pub unit_suffix: String,
    /// Samples in ascending time order.
    pub samples: Vec<(DateTime<Utc>, f64)>,
}

impl MetricSeries {
    pub fn new(metric: ChartMetric, lookback_days: u32, samples: Vec<(DateTime<Utc>, f64)>) -> Self {
        Self {
            metric,
            title: format!("{} ({} Days)", metric.title(), lookback_days),
            axis_title: metric.axis_title().to_string(),
            unit_suffix: metric.unit_suffix().to_string(),
            samples,
        }
    }

    /// The most recent sample.
    pub fn latest(&self) -> Option<&(DateTime<Utc>, f64)> {
        self.samples.last()
    }

    /// Minimum and maximum values, if there are any samples.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.samples.iter().map(|(_, v)| *v).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Trailing history for the chart collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryReport {
    pub lookback_days: u32,
    /// Only metrics with at least one sample are present.
    pub series: Vec<MetricSeries>,
}

impl HistoryReport {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, metric: ChartMetric) -> Option<&MetricSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }
}
