//! Raw payload to view model conversion.
//!
//! All functions here are pure. Missing sections and readings propagate as
//! `None`; the only substituted value is the `"0.0"` wind speed for a
//! reading that is not a number.

use chrono::{DateTime, Duration, Utc};
use coastwatch_core::{
    ChartMetric, HistoryReport, LightningView, LocalTideExtreme, MetricSeries, OutdoorView,
    PressureView, RainfallView, ReferenceTimezone, SolarView, TideExtreme, TideFilter, TideWindow,
    WeatherReport, WindView, compass_bucket, convert_kmh_to_ms, kmh_to_ms, pressure_trend,
    wind_rose_sector,
};

use crate::ecowitt::{HistoricalSeries, Metric, RealtimePayload, WindSection};

fn numeric(metric: &Option<Metric>) -> Option<f64> {
    metric.as_ref().and_then(Metric::numeric)
}

fn speed(metric: &Option<Metric>) -> String {
    convert_kmh_to_ms(metric.as_ref().and_then(Metric::raw).unwrap_or_default())
}

fn wind_view(wind: &WindSection) -> WindView {
    let direction_deg = numeric(&wind.wind_direction);
    WindView {
        speed_ms: speed(&wind.wind_speed),
        gust_ms: speed(&wind.wind_gust),
        direction_deg,
        compass: direction_deg.map(compass_bucket),
        rose_sector: direction_deg.map(wind_rose_sector),
    }
}

/// Converts a realtime payload into a [`WeatherReport`].
pub fn normalize_realtime(payload: &RealtimePayload) -> WeatherReport {
    let data = &payload.data;

    WeatherReport {
        captured_at: payload.captured_at,
        outdoor: data.outdoor.as_ref().map(|s| OutdoorView {
            temperature_c: numeric(&s.temperature),
            feels_like_c: numeric(&s.feels_like),
            humidity_pct: numeric(&s.humidity),
            dew_point_c: numeric(&s.dew_point),
        }),
        wind: data.wind.as_ref().map(wind_view),
        rainfall: data.rainfall.as_ref().map(|s| RainfallView {
            rate_mm_h: numeric(&s.rain_rate),
            daily_mm: numeric(&s.daily),
        }),
        pressure: data.pressure.as_ref().map(|s| PressureView {
            absolute_hpa: numeric(&s.absolute),
            trend: pressure_trend(numeric(&s.trend)),
        }),
        solar: data.solar_and_uvi.as_ref().map(|s| SolarView {
            radiation_w_m2: numeric(&s.solar),
            uv_index: numeric(&s.uvi),
        }),
        lightning: data.lightning.as_ref().map(|s| LightningView {
            count: numeric(&s.count),
            distance_km: numeric(&s.distance),
        }),
        soil_moisture_pct: data.soil_moisture(),
    }
}

/// Builds the chart series from raw history.
///
/// Metrics without samples are left out. Wind speed is converted to m/s.
pub fn normalize_history(history: &HistoricalSeries, lookback_days: u32) -> HistoryReport {
    let series = ChartMetric::ALL
        .iter()
        .filter_map(|metric| {
            let (section, name) = metric.source();
            let raw = history.samples(section, name);
            if raw.is_empty() {
                return None;
            }

            let mut samples: Vec<(DateTime<Utc>, f64)> = raw
                .iter()
                .map(|s| match metric {
                    ChartMetric::WindSpeed => (s.time, kmh_to_ms(s.value)),
                    _ => (s.time, s.value),
                })
                .collect();
            samples.sort_by_key(|(time, _)| *time);

            Some(MetricSeries::new(*metric, lookback_days, samples))
        })
        .collect();

    HistoryReport {
        lookback_days,
        series,
    }
}

/// Selects the extremes inside `[now, now + horizon]` that pass `filter`,
/// resolved into `timezone` and sorted by time.
///
/// Both bounds are inclusive, and a horizon past the representable range
/// leaves the window open-ended. The comparison is made on instants, so the
/// reference timezone only affects how the result is displayed.
pub fn filter_tide_window(
    extremes: &[TideExtreme],
    now: DateTime<Utc>,
    horizon: Duration,
    filter: TideFilter,
    timezone: ReferenceTimezone,
) -> TideWindow {
    let end = now.checked_add_signed(horizon).unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut selected: Vec<&TideExtreme> = extremes
        .iter()
        .filter(|e| filter.accepts(e.kind))
        .filter(|e| e.time >= now && e.time <= end)
        .collect();
    selected.sort_by_key(|e| e.time);

    TideWindow {
        extremes: selected
            .into_iter()
            .map(|e| LocalTideExtreme {
                time: timezone.resolve(e.time),
                kind: e.kind,
                height_m: e.height_m,
            })
            .collect(),
        start: timezone.resolve(now),
        end: timezone.resolve(end),
    }
}
