//! Raw Ecowitt payloads and body parsing.
//!
//! Everything the API returns is wrapped in an envelope
//! `{ code, msg, time, data }`. A non-zero `code` is an upstream rejection
//! and a body without one is not an Ecowitt response at all.
//! `data` is an object of sections, or `[]` when the station has not
//! reported anything yet.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::trace;

use super::PROVIDER_NAME;
use crate::error::{ProviderError, ProviderResult};

/// Highest soil moisture channel the API reports.
const MAX_SOIL_CHANNEL: u8 = 16;

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    fn parse(body: &str) -> ProviderResult<Self> {
        let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
            ProviderError::decode(format!("failed to parse response: {}", e))
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?;

        match envelope.code {
            0 => Ok(envelope),
            code => {
                let msg = envelope
                    .msg
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("unknown error (code {})", code));
                Err(ProviderError::upstream_rejected(msg).with_provider(PROVIDER_NAME))
            }
        }
    }

    fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.time.as_ref().and_then(unix_seconds)
    }
}

/// One reading: `{ "time": "...", "unit": "℃", "value": "12.3" }`.
///
/// Values are strings on the wire; numbers are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metric {
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
}

impl Metric {
    pub fn raw(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn numeric(&self) -> Option<f64> {
        self.raw().and_then(coastwatch_core::parse_numeric)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OutdoorSection {
    pub temperature: Option<Metric>,
    pub feels_like: Option<Metric>,
    pub humidity: Option<Metric>,
    pub dew_point: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WindSection {
    pub wind_speed: Option<Metric>,
    pub wind_gust: Option<Metric>,
    pub wind_direction: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RainfallSection {
    pub rain_rate: Option<Metric>,
    pub daily: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PressureSection {
    pub absolute: Option<Metric>,
    pub relative: Option<Metric>,
    pub trend: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SolarSection {
    pub solar: Option<Metric>,
    pub uvi: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LightningSection {
    pub count: Option<Metric>,
    pub distance: Option<Metric>,
}

/// The `data` object of a realtime response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RealtimeData {
    pub outdoor: Option<OutdoorSection>,
    pub wind: Option<WindSection>,
    pub rainfall: Option<RainfallSection>,
    pub pressure: Option<PressureSection>,
    pub solar_and_uvi: Option<SolarSection>,
    pub lightning: Option<LightningSection>,
    /// Sections without a dedicated field (`indoor`, `soil_ch1`, ...).
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl RealtimeData {
    /// Soil moisture readings keyed by channel number.
    ///
    /// Channels whose reading is missing or not numeric are skipped.
    pub fn soil_moisture(&self) -> BTreeMap<u8, f64> {
        self.other
            .iter()
            .filter_map(|(name, section)| {
                let channel = name.strip_prefix("soil_ch")?.parse::<u8>().ok()?;
                if !(1..=MAX_SOIL_CHANNEL).contains(&channel) {
                    return None;
                }
                let metric: Metric = serde_json::from_value(section.get("soilmoisture")?.clone()).ok()?;
                Some((channel, metric.numeric()?))
            })
            .collect()
    }
}

/// A decoded realtime response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealtimePayload {
    /// Envelope timestamp, when present.
    pub captured_at: Option<DateTime<Utc>>,
    pub data: RealtimeData,
}

/// Parses a `device/real_time` response body.
pub fn parse_realtime_body(body: &str) -> ProviderResult<RealtimePayload> {
    let envelope = Envelope::parse(body)?;
    let captured_at = envelope.captured_at();

    let data = match envelope.data {
        Value::Null => RealtimeData::default(),
        Value::Array(items) if items.is_empty() => RealtimeData::default(),
        Value::Object(sections) => serde_json::from_value(Value::Object(sections)).map_err(|e| {
            ProviderError::decode(format!("unexpected realtime data: {}", e))
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?,
        other => {
            return Err(ProviderError::decode(format!(
                "unexpected realtime data type: {}",
                json_type(&other)
            ))
            .with_provider(PROVIDER_NAME));
        }
    };

    Ok(RealtimePayload { captured_at, data })
}

/// One history sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistorySample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Trailing history, keyed by `section.metric` (e.g. `outdoor.temperature`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    pub metrics: BTreeMap<String, Vec<HistorySample>>,
}

impl HistoricalSeries {
    pub fn is_empty(&self) -> bool {
        self.metrics.values().all(Vec::is_empty)
    }

    /// Samples for `section.metric`, in ascending time order.
    pub fn samples(&self, section: &str, metric: &str) -> &[HistorySample] {
        self.metrics
            .get(&format!("{}.{}", section, metric))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Parses a `device/history` response body.
///
/// Only the envelope has to be well formed. Sections, metrics and samples
/// that do not have the expected shape are skipped.
pub fn parse_history_body(body: &str) -> ProviderResult<HistoricalSeries> {
    let envelope = Envelope::parse(body)?;
    let mut series = HistoricalSeries::default();

    let Value::Object(sections) = envelope.data else {
        trace!("history data is not an object; treating as empty");
        return Ok(series);
    };

    for (section, metrics) in &sections {
        let Some(metrics) = metrics.as_object() else {
            continue;
        };
        for (metric, body) in metrics {
            let Some(list) = body.get("list").and_then(Value::as_object) else {
                continue;
            };

            let mut samples: Vec<HistorySample> = list
                .iter()
                .filter_map(|(ts, raw)| {
                    let time = ts.parse::<i64>().ok().and_then(|s| DateTime::from_timestamp(s, 0))?;
                    let value = match raw {
                        Value::String(s) => coastwatch_core::parse_numeric(s),
                        Value::Number(n) => n.as_f64(),
                        _ => None,
                    }?;
                    Some(HistorySample { time, value })
                })
                .collect();

            if samples.is_empty() {
                continue;
            }
            samples.sort_by_key(|s| s.time);
            series.metrics.insert(format!("{}.{}", section, metric), samples);
        }
    }

    Ok(series)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn unix_seconds(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    const REALTIME: &str = r#"{
        "code": 0,
        "msg": "success",
        "time": "1735732800",
        "data": {
            "outdoor": {
                "temperature": {"time": "1735732790", "unit": "℃", "value": "8.4"},
                "feels_like": {"time": "1735732790", "unit": "℃", "value": "6.1"},
                "humidity": {"time": "1735732790", "unit": "%", "value": "87"}
            },
            "wind": {
                "wind_speed": {"unit": "km/h", "value": "18.0"},
                "wind_direction": {"unit": "º", "value": 247}
            },
            "indoor": {"temperature": {"value": "20.1"}},
            "soil_ch1": {"soilmoisture": {"unit": "%", "value": "41"}},
            "soil_ch3": {"soilmoisture": {"unit": "%", "value": "--"}}
        }
    }"#;

    mod realtime {
        use super::*;

        #[test]
        fn parses_sections() {
            let payload = parse_realtime_body(REALTIME).unwrap();
            assert_eq!(
                payload.captured_at,
                DateTime::from_timestamp(1_735_732_800, 0)
            );

            let outdoor = payload.data.outdoor.as_ref().unwrap();
            assert_eq!(outdoor.temperature.as_ref().unwrap().numeric(), Some(8.4));
            assert!(outdoor.dew_point.is_none());

            let wind = payload.data.wind.as_ref().unwrap();
            assert_eq!(wind.wind_direction.as_ref().unwrap().raw(), Some("247"));
            assert!(wind.wind_gust.is_none());

            assert!(payload.data.pressure.is_none());
            assert!(payload.data.other.contains_key("indoor"));
        }

        #[test]
        fn soil_channels() {
            let payload = parse_realtime_body(REALTIME).unwrap();
            let soil = payload.data.soil_moisture();
            assert_eq!(soil.len(), 1);
            assert_eq!(soil.get(&1), Some(&41.0));
        }

        #[test]
        fn empty_array_data() {
            let payload =
                parse_realtime_body(r#"{"code":0,"msg":"success","time":"1","data":[]}"#).unwrap();
            assert_eq!(payload.data, RealtimeData::default());
        }

        #[test]
        fn non_zero_code_is_rejected() {
            let err = parse_realtime_body(r#"{"code":40010,"msg":"Illegal Application_Key Parameter","data":[]}"#)
                .unwrap_err();
            assert_eq!(err.kind(), ProviderErrorKind::UpstreamRejected);
            assert_eq!(err.message(), "Illegal Application_Key Parameter");
            assert_eq!(err.provider(), Some("ecowitt"));
        }

        #[test]
        fn non_zero_code_without_message() {
            let err = parse_realtime_body(r#"{"code":-1}"#).unwrap_err();
            assert_eq!(err.message(), "unknown error (code -1)");
        }

        #[test]
        fn invalid_json_is_decode() {
            let err = parse_realtime_body("<html>502 Bad Gateway</html>").unwrap_err();
            assert_eq!(err.kind(), ProviderErrorKind::Decode);
        }

        #[test]
        fn body_without_code_is_decode() {
            for body in ["{}", "[]", r#"{"error":"Bad Gateway"}"#] {
                let err = parse_realtime_body(body).unwrap_err();
                assert_eq!(err.kind(), ProviderErrorKind::Decode, "body: {}", body);
                assert_eq!(err.provider(), Some("ecowitt"));
            }
            assert!(parse_history_body("{}").is_err());
        }

        #[test]
        fn scalar_data_is_decode() {
            let err = parse_realtime_body(r#"{"code":0,"data":"nope"}"#).unwrap_err();
            assert_eq!(err.kind(), ProviderErrorKind::Decode);
            assert!(err.message().contains("string"));
        }

        #[test]
        fn malformed_section_is_decode() {
            let err = parse_realtime_body(r#"{"code":0,"data":{"outdoor":"hot"}}"#).unwrap_err();
            assert_eq!(err.kind(), ProviderErrorKind::Decode);
        }
    }

    mod history {
        use super::*;

        #[test]
        fn parses_and_sorts_samples() {
            let body = r#"{
                "code": 0,
                "msg": "success",
                "data": {
                    "outdoor": {
                        "temperature": {
                            "unit": "℃",
                            "list": {"1735734600": "9.0", "1735732800": "8.5", "1735736400": "-"}
                        }
                    },
                    "wind": {"wind_speed": {"unit": "km/h", "list": {"1735732800": 36}}}
                }
            }"#;
            let series = parse_history_body(body).unwrap();

            let temps = series.samples("outdoor", "temperature");
            assert_eq!(temps.len(), 2);
            assert_eq!(temps[0].value, 8.5);
            assert_eq!(temps[1].value, 9.0);
            assert!(temps[0].time < temps[1].time);

            assert_eq!(series.samples("wind", "wind_speed")[0].value, 36.0);
            assert!(series.samples("pressure", "absolute").is_empty());
        }

        #[test]
        fn empty_or_malformed_is_empty() {
            for body in [
                r#"{"code":0,"data":[]}"#,
                r#"{"code":0,"data":{}}"#,
                r#"{"code":0,"data":{"outdoor":{"temperature":{"list":"oops"}}}}"#,
                r#"{"code":0,"data":{"outdoor":[1,2,3]}}"#,
            ] {
                let series = parse_history_body(body).unwrap();
                assert!(series.is_empty(), "{body}");
            }
        }

        #[test]
        fn rejection_is_still_an_error() {
            let err = parse_history_body(r#"{"code":40000,"msg":"device not found"}"#).unwrap_err();
            assert_eq!(err.kind(), ProviderErrorKind::UpstreamRejected);
        }
    }
}
