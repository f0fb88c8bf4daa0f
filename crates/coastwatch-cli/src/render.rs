//! Text and JSON rendering of pipeline results.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset};
use coastwatch_core::{HistoryReport, ReferenceTimezone, TideKind, TideWindow, WeatherReport};
use coastwatch_pipeline::{Dashboard, Section, SectionNotice, WeatherView};
use coastwatch_providers::Severity;
use serde::Serialize;

use crate::error::ClientResult;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty-printed JSON for any view.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> ClientResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

const TIME_FORMAT: &str = "%a %d %b %H:%M";

fn stamp(time: DateTime<FixedOffset>) -> String {
    time.format("%Y-%m-%d %H:%M %:z").to_string()
}

fn push_value(out: &mut String, label: &str, value: Option<f64>, unit: &str) {
    if let Some(v) = value {
        let _ = writeln!(out, "{:<12}{:.1}{}", label, v, unit);
    }
}

/// Current conditions, one reading per line. Absent readings are skipped.
pub fn weather_text(report: &WeatherReport, timezone: &ReferenceTimezone) -> String {
    if report.is_empty() {
        return "No readings reported by the station.\n".to_string();
    }

    let mut out = String::new();
    match report.captured_at {
        Some(at) => {
            let _ = writeln!(out, "Conditions at {}", stamp(timezone.resolve(at)));
        }
        None => out.push_str("Current conditions\n"),
    }

    if let Some(ref outdoor) = report.outdoor {
        push_value(&mut out, "Temperature", outdoor.temperature_c, " °C");
        push_value(&mut out, "Feels like", outdoor.feels_like_c, " °C");
        push_value(&mut out, "Humidity", outdoor.humidity_pct, " %");
        push_value(&mut out, "Dew point", outdoor.dew_point_c, " °C");
    }

    if let Some(ref wind) = report.wind {
        let _ = write!(out, "{:<12}{} m/s, gusts {} m/s", "Wind", wind.speed_ms, wind.gust_ms);
        if let (Some(compass), Some(degrees)) = (wind.compass, wind.direction_deg) {
            let _ = write!(out, " from {} ({:.0}°)", compass.label(), degrees);
        }
        out.push('\n');
    }

    if let Some(ref rainfall) = report.rainfall {
        push_value(&mut out, "Rain rate", rainfall.rate_mm_h, " mm/h");
        push_value(&mut out, "Rain today", rainfall.daily_mm, " mm");
    }

    if let Some(ref pressure) = report.pressure {
        match (pressure.absolute_hpa, pressure.trend) {
            (Some(hpa), Some(trend)) => {
                let _ = writeln!(out, "{:<12}{:.1} hPa, {}", "Pressure", hpa, trend.label());
            }
            (Some(hpa), None) => {
                let _ = writeln!(out, "{:<12}{:.1} hPa", "Pressure", hpa);
            }
            (None, Some(trend)) => {
                let _ = writeln!(out, "{:<12}{}", "Pressure", trend.label());
            }
            (None, None) => {}
        }
    }

    if let Some(ref solar) = report.solar {
        push_value(&mut out, "Solar", solar.radiation_w_m2, " W/m²");
        push_value(&mut out, "UV index", solar.uv_index, "");
    }

    if let Some(ref lightning) = report.lightning {
        push_value(&mut out, "Lightning", lightning.count, " strikes");
        push_value(&mut out, "Strike dist", lightning.distance_km, " km");
    }

    for (channel, pct) in &report.soil_moisture_pct {
        push_value(&mut out, &format!("Soil ch{}", channel), Some(*pct), " %");
    }

    out
}

/// One summary line per history series.
pub fn history_text(report: &HistoryReport) -> String {
    if report.is_empty() {
        return format!(
            "No history recorded over the last {} days.\n",
            report.lookback_days
        );
    }

    let mut out = format!("History over the last {} days\n", report.lookback_days);
    for series in &report.series {
        let unit = series.unit_suffix.as_str();
        let _ = write!(
            out,
            "{:<20}{:>5} samples",
            series.metric.title(),
            series.samples.len()
        );
        if let Some((lo, hi)) = series.range() {
            let _ = write!(out, "  min {:.1}{}  max {:.1}{}", lo, unit, hi, unit);
        }
        if let Some((_, latest)) = series.latest() {
            let _ = write!(out, "  latest {:.1}{}", latest, unit);
        }
        out.push('\n');
    }
    out
}

/// Tide extremes in the window, in the window's timezone.
pub fn tides_text(window: &TideWindow) -> String {
    if window.is_empty() {
        return format!(
            "No tide extremes between {} and {}.\n",
            stamp(window.start),
            stamp(window.end)
        );
    }

    let mut out = format!("Tides {} to {}\n", stamp(window.start), stamp(window.end));
    for extreme in &window.extremes {
        let kind = match extreme.kind {
            TideKind::High => "High",
            TideKind::Low => "Low",
        };
        let _ = writeln!(
            out,
            "  {:<5}{}  {:.2} m",
            kind,
            extreme.time.format(TIME_FORMAT),
            extreme.height_m
        );
    }
    out
}

/// A failed section, e.g. `warning: Could not reach ecowitt; ...`.
pub fn notice_text(notice: &SectionNotice) -> String {
    let level = match notice.severity {
        Severity::Notice => "notice",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("{}: {}\n", level, notice.message)
}

/// Both dashboard sections, failed ones replaced by their notice.
pub fn dashboard_text(dashboard: &Dashboard, timezone: &ReferenceTimezone) -> String {
    let mut out = String::from("== Weather ==\n");
    match dashboard.weather {
        Section::Ready(WeatherView::Realtime(ref report)) => {
            out.push_str(&weather_text(report, timezone))
        }
        Section::Ready(WeatherView::Historical(ref report)) => out.push_str(&history_text(report)),
        Section::Failed(ref notice) => out.push_str(&notice_text(notice)),
    }

    out.push_str("\n== Tides ==\n");
    match dashboard.tides {
        Section::Ready(ref window) => out.push_str(&tides_text(window)),
        Section::Failed(ref notice) => out.push_str(&notice_text(notice)),
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use coastwatch_core::{
        ChartMetric, CompassPoint, LocalTideExtreme, MetricSeries, OutdoorView, PressureTrend,
        PressureView, RoseSector, WindView,
    };
    use coastwatch_providers::{ProviderError, ProviderResult};

    use super::*;

    fn utc(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, h, 0, 0).unwrap()
    }

    fn report() -> WeatherReport {
        WeatherReport {
            captured_at: Some(utc(12)),
            outdoor: Some(OutdoorView {
                temperature_c: Some(14.2),
                humidity_pct: Some(81.0),
                ..Default::default()
            }),
            wind: Some(WindView {
                speed_ms: "3.2".into(),
                gust_ms: "5.1".into(),
                direction_deg: Some(225.0),
                compass: Some(CompassPoint::Sw),
                rose_sector: Some(RoseSector::Sw),
            }),
            pressure: Some(PressureView {
                absolute_hpa: Some(1013.2),
                trend: Some(PressureTrend::Falling),
            }),
            soil_moisture_pct: BTreeMap::from([(1, 34.0)]),
            ..Default::default()
        }
    }

    fn window(extremes: Vec<LocalTideExtreme>) -> TideWindow {
        TideWindow {
            extremes,
            start: utc(12).fixed_offset(),
            end: utc(12).fixed_offset() + chrono::TimeDelta::hours(48),
        }
    }

    mod weather {
        use super::*;

        #[test]
        fn renders_present_readings() {
            let text = weather_text(&report(), &ReferenceTimezone::Utc);
            assert!(text.starts_with("Conditions at 2026-10-16 12:00 +00:00\n"));
            assert!(text.contains("Temperature 14.2 °C\n"));
            assert!(text.contains("Humidity    81.0 %\n"));
            assert!(text.contains("Wind        3.2 m/s, gusts 5.1 m/s from SW (225°)\n"));
            assert!(text.contains("Pressure    1013.2 hPa, falling\n"));
            assert!(text.contains("Soil ch1    34.0 %\n"));
            assert!(!text.contains("Feels like"));
            assert!(!text.contains("Solar"));
        }

        #[test]
        fn pressure_trend_without_reading() {
            let mut report = report();
            report.pressure = Some(PressureView {
                absolute_hpa: None,
                trend: Some(PressureTrend::Rising),
            });
            let text = weather_text(&report, &ReferenceTimezone::Utc);
            assert!(text.contains("Pressure    rising\n"), "{}", text);
        }

        #[test]
        fn captured_at_uses_timezone() {
            let tz: ReferenceTimezone = "+02:00".parse().unwrap();
            let text = weather_text(&report(), &tz);
            assert!(text.starts_with("Conditions at 2026-10-16 14:00 +02:00\n"));
        }

        #[test]
        fn empty_report() {
            let text = weather_text(&WeatherReport::default(), &ReferenceTimezone::Utc);
            assert_eq!(text, "No readings reported by the station.\n");
        }
    }

    mod history {
        use super::*;

        #[test]
        fn summarizes_each_series() {
            let report = HistoryReport {
                lookback_days: 7,
                series: vec![MetricSeries::new(
                    ChartMetric::PressureAbsolute,
                    7,
                    vec![(utc(10), 1010.0), (utc(11), 1012.5), (utc(12), 1011.0)],
                )],
            };
            let text = history_text(&report);
            assert!(text.starts_with("History over the last 7 days\n"));
            assert!(text.contains("Absolute Pressure"));
            assert!(text.contains("3 samples"));
            assert!(text.contains("min 1010.0 hPa  max 1012.5 hPa  latest 1011.0 hPa"));
        }

        #[test]
        fn empty_history() {
            let report = HistoryReport {
                lookback_days: 3,
                series: Vec::new(),
            };
            assert_eq!(
                history_text(&report),
                "No history recorded over the last 3 days.\n"
            );
        }
    }

    mod tides {
        use super::*;

        #[test]
        fn lists_extremes() {
            let text = tides_text(&window(vec![
                LocalTideExtreme {
                    time: utc(17).fixed_offset(),
                    kind: TideKind::High,
                    height_m: 4.312,
                },
                LocalTideExtreme {
                    time: utc(23).fixed_offset(),
                    kind: TideKind::Low,
                    height_m: 0.8,
                },
            ]));
            assert!(text.starts_with("Tides 2026-10-16 12:00 +00:00 to 2026-10-18 12:00 +00:00\n"));
            assert!(text.contains("  High Fri 16 Oct 17:00  4.31 m\n"));
            assert!(text.contains("  Low  Fri 16 Oct 23:00  0.80 m\n"));
        }

        #[test]
        fn empty_window_is_reported() {
            let text = tides_text(&window(Vec::new()));
            assert_eq!(
                text,
                "No tide extremes between 2026-10-16 12:00 +00:00 and 2026-10-18 12:00 +00:00.\n"
            );
        }
    }

    mod dashboard {
        use super::*;

        fn dashboard() -> Dashboard {
            let failed: ProviderResult<TideWindow> =
                Err(ProviderError::network("timed out").with_provider("stormglass"));
            Dashboard {
                weather: Section::Ready(WeatherView::Realtime(report())),
                tides: Section::from(failed),
            }
        }

        #[test]
        fn failed_section_shows_notice() {
            let text = dashboard_text(&dashboard(), &ReferenceTimezone::Utc);
            assert!(text.starts_with("== Weather ==\nConditions at"));
            assert!(text.contains(
                "== Tides ==\nwarning: Could not reach stormglass; will retry on the next request\n"
            ));
        }

        #[test]
        fn json_tags_sections() {
            let json = to_json(&dashboard()).unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["weather"]["status"], "ready");
            assert_eq!(value["weather"]["data"]["mode"], "realtime");
            assert_eq!(value["tides"]["status"], "failed");
            assert_eq!(value["tides"]["data"]["kind"], "network");
            assert_eq!(value["tides"]["data"]["severity"], "warning");
        }
    }
}
