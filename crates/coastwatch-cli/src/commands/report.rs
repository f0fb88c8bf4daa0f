//! Weather, history, tide and dashboard commands.
//!
//! Single-section commands return the provider error so the process exits
//! non-zero. The dashboard always succeeds and prints notices inline.

use coastwatch_core::TideFilter;
use coastwatch_pipeline::{DashboardOptions, Pipeline, ViewMode};
use serde::Serialize;

use crate::error::ClientResult;
use crate::render::{self, OutputFormat};

fn emit<T: Serialize>(view: &T, format: OutputFormat, text: impl FnOnce(&T) -> String) -> ClientResult<()> {
    match format {
        OutputFormat::Json => println!("{}", render::to_json(view)?),
        OutputFormat::Text => print!("{}", text(view)),
    }
    Ok(())
}

/// Current conditions.
pub async fn weather(pipeline: &Pipeline, format: OutputFormat) -> ClientResult<()> {
    let report = pipeline.realtime().await?;
    let timezone = pipeline.config().timezone;
    emit(&report, format, |r| render::weather_text(r, &timezone))
}

/// Trailing history.
pub async fn history(pipeline: &Pipeline, format: OutputFormat) -> ClientResult<()> {
    let report = pipeline.history().await?;
    emit(&report, format, render::history_text)
}

/// Upcoming tide extremes. `all` adds low waters.
pub async fn tides(pipeline: &Pipeline, all: bool, format: OutputFormat) -> ClientResult<()> {
    let filter = if all {
        TideFilter::All
    } else {
        pipeline.config().tide_filter
    };
    let window = pipeline.tides(filter).await?;
    emit(&window, format, render::tides_text)
}

/// Weather and tides together.
pub async fn dashboard(
    pipeline: &Pipeline,
    history: bool,
    all_tides: bool,
    format: OutputFormat,
) -> ClientResult<()> {
    let options = DashboardOptions {
        mode: if history {
            ViewMode::Historical
        } else {
            ViewMode::Realtime
        },
        tide_filter: all_tides.then_some(TideFilter::All),
    };
    let dashboard = pipeline.dashboard(options).await;
    let timezone = pipeline.config().timezone;
    emit(&dashboard, format, |d| render::dashboard_text(d, &timezone))
}
