//! Unit conversions and classifications applied to station readings.
//!
//! Every function here is total: bad or missing input degrades to a
//! documented default instead of an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Parses a numeric reading the way the telemetry API encodes it (a string
/// such as `"12.3"`). Non-finite values are treated as unparseable.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts km/h to m/s, rounded to one decimal place.
pub fn kmh_to_ms(kmh: f64) -> f64 {
    // Adding 0.0 folds -0.0 into 0.0.
    (kmh / 3.6 * 10.0).round() / 10.0 + 0.0
}

/// Converts a raw km/h reading to a one-decimal m/s string.
///
/// Anything that is not a number yields `"0.0"`.
pub fn convert_kmh_to_ms(raw: &str) -> String {
    let ms = parse_numeric(raw).map(kmh_to_ms).unwrap_or(0.0);
    format!("{:.1}", ms)
}

/// The 16 points of the compass, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassPoint {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl CompassPoint {
    /// All points in bucket order.
    pub const ALL: [CompassPoint; 16] = [
        Self::N,
        Self::Nne,
        Self::Ne,
        Self::Ene,
        Self::E,
        Self::Ese,
        Self::Se,
        Self::Sse,
        Self::S,
        Self::Ssw,
        Self::Sw,
        Self::Wsw,
        Self::W,
        Self::Wnw,
        Self::Nw,
        Self::Nnw,
    ];

    /// Returns the conventional abbreviation (`"NNE"`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Nne => "NNE",
            Self::Ne => "NE",
            Self::Ene => "ENE",
            Self::E => "E",
            Self::Ese => "ESE",
            Self::Se => "SE",
            Self::Sse => "SSE",
            Self::S => "S",
            Self::Ssw => "SSW",
            Self::Sw => "SW",
            Self::Wsw => "WSW",
            Self::W => "W",
            Self::Wnw => "WNW",
            Self::Nw => "NW",
            Self::Nnw => "NNW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rounds `degrees / width` to the nearest sector and wraps it into
/// `0..sectors`.
///
/// Halves round upwards rather than away from zero so that the result is
/// invariant under whole turns, including for negative bearings.
fn sector_index(degrees: f64, width: f64, sectors: i64) -> usize {
    if !degrees.is_finite() {
        return 0;
    }
    let index = (degrees / width + 0.5).floor() as i64;
    index.rem_euclid(sectors) as usize
}

/// Buckets a bearing into one of 16 compass points.
///
/// Accepts any real value (negative, or a full turn and more). Non-finite
/// input maps to north.
pub fn compass_bucket(degrees: f64) -> CompassPoint {
    CompassPoint::ALL[sector_index(degrees, 22.5, 16)]
}

/// The 8 sectors drawn on the wind-rose chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoseSector {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl RoseSector {
    /// All sectors in chart order.
    pub const ALL: [RoseSector; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    /// Position of this sector on the chart's category axis.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Buckets a bearing into one of the 8 wind-rose sectors.
pub fn wind_rose_sector(degrees: f64) -> RoseSector {
    RoseSector::ALL[sector_index(degrees, 45.0, 8)]
}

/// Barometric pressure tendency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureTrend {
    FallingRapidly,
    Falling,
    Steady,
    Rising,
}

impl PressureTrend {
    /// Classifies a raw trend delta.
    pub fn classify(delta: f64) -> Self {
        if delta < -60.0 {
            Self::FallingRapidly
        } else if delta < -20.0 {
            Self::Falling
        } else if delta < 20.0 {
            Self::Steady
        } else {
            Self::Rising
        }
    }

    /// Human-readable description.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FallingRapidly => "falling rapidly",
            Self::Falling => "falling",
            Self::Steady => "steady",
            Self::Rising => "rising",
        }
    }
}

impl fmt::Display for PressureTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies an optional trend delta. Missing or non-finite input has no trend.
pub fn pressure_trend(delta: Option<f64>) -> Option<PressureTrend> {
    delta.filter(|d| d.is_finite()).map(PressureTrend::classify)
}

/// Like [`pressure_trend`], but returns the label, or `""` when there is none.
pub fn pressure_trend_text(delta: Option<f64>) -> &'static str {
    pressure_trend(delta).map(|t| t.label()).unwrap_or("")
}
