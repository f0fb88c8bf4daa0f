//! Tide extremes and display windows.
//!
//! Predictions arrive in UTC. They are displayed in a caller-chosen
//! reference timezone, so a [`TideWindow`] carries fixed-offset timestamps
//! resolved against that zone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Whether an extreme is a high or a low water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for TideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicted high or low water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideExtreme {
    /// Prediction time in UTC.
    pub time: DateTime<Utc>,
    /// High or low.
    pub kind: TideKind,
    /// Height relative to the provider's datum, in metres.
    pub height_m: f64,
}

impl TideExtreme {
    pub fn new(time: DateTime<Utc>, kind: TideKind, height_m: f64) -> Self {
        Self {
            time,
            kind,
            height_m,
        }
    }
}

/// Which extremes a caller wants to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideFilter {
    /// High waters only.
    #[default]
    High,
    /// Both high and low waters.
    All,
}

impl TideFilter {
    /// Returns true if extremes of `kind` pass this filter.
    pub fn accepts(&self, kind: TideKind) -> bool {
        match self {
            Self::High => kind == TideKind::High,
            Self::All => true,
        }
    }
}

/// An extreme resolved into the reference timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalTideExtreme {
    pub time: DateTime<FixedOffset>,
    pub kind: TideKind,
    pub height_m: f64,
}

/// Extremes falling inside `[start, end]`, sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideWindow {
    pub extremes: Vec<LocalTideExtreme>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TideWindow {
    /// Returns true when no prediction fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.extremes.is_empty()
    }

    /// Number of extremes in the window.
    pub fn len(&self) -> usize {
        self.extremes.len()
    }

    /// The next extreme at or after the window start, if any.
    pub fn next(&self) -> Option<&LocalTideExtreme> {
        self.extremes.first()
    }
}

/// Error parsing a [`ReferenceTimezone`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timezone {0:?}: expected \"local\", \"UTC\", an offset such as \"+01:00\" or a zone name such as \"Europe/London\"")]
pub struct TimezoneError(String);

/// The timezone tide times are displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceTimezone {
    /// The host's local zone, including daylight saving.
    #[default]
    Local,
    /// UTC.
    Utc,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
    /// An IANA zone such as `Europe/London`, including its daylight saving.
    Named(Tz),
}

impl ReferenceTimezone {
    /// Converts an instant into this zone.
    pub fn resolve(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Local => instant.with_timezone(&Local).fixed_offset(),
            Self::Utc => instant.fixed_offset(),
            Self::Fixed(offset) => offset.from_utc_datetime(&instant.naive_utc()),
            Self::Named(tz) => instant.with_timezone(tz).fixed_offset(),
        }
    }
}

impl fmt::Display for ReferenceTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("UTC"),
            Self::Fixed(offset) => write!(f, "{}", offset),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for ReferenceTimezone {
    type Err = TimezoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::Utc);
        }
        if let Ok(offset) = trimmed.parse::<FixedOffset>() {
            return Ok(Self::Fixed(offset));
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| TimezoneError(s.to_string()))
    }
}

impl Serialize for ReferenceTimezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceTimezone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts() {
        assert!(TideFilter::High.accepts(TideKind::High));
        assert!(!TideFilter::High.accepts(TideKind::Low));
        assert!(TideFilter::All.accepts(TideKind::Low));
    }

    #[test]
    fn parses_timezones() {
        assert_eq!(
            "local".parse::<ReferenceTimezone>().unwrap(),
            ReferenceTimezone::Local
        );
        assert_eq!(
            "UTC".parse::<ReferenceTimezone>().unwrap(),
            ReferenceTimezone::Utc
        );
        assert_eq!(
            "+01:00".parse::<ReferenceTimezone>().unwrap(),
            ReferenceTimezone::Fixed(FixedOffset::east_opt(3600).unwrap())
        );
        assert!("Mars/Olympus".parse::<ReferenceTimezone>().is_err());
    }

    #[test]
    fn resolves_fixed_offset() {
        let tz = ReferenceTimezone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let local = tz.resolve(instant);
        assert_eq!(local.to_rfc3339(), "2025-03-01T07:00:00-05:00");
        assert_eq!(local, instant);
    }

    #[test]
    fn named_zone_follows_daylight_saving() {
        let tz: ReferenceTimezone = "Europe/London".parse().unwrap();
        assert_eq!(tz, ReferenceTimezone::Named(chrono_tz::Europe::London));
        assert_eq!(tz.to_string(), "Europe/London");

        // Clocks go forward at 01:00 UTC on 2026-03-29.
        let before = Utc.with_ymd_and_hms(2026, 3, 29, 0, 30, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 3, 29, 1, 30, 0).unwrap();
        assert_eq!(tz.resolve(before).to_rfc3339(), "2026-03-29T00:30:00+00:00");
        assert_eq!(tz.resolve(after).to_rfc3339(), "2026-03-29T02:30:00+01:00");
        assert_eq!(tz.resolve(after), after);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TideKind::High).unwrap(), "\"high\"");
        let kind: TideKind = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(kind, TideKind::Low);
    }
}
