//! Stormglass tide provider.
//!
//! Fetches tide extremes (high and low waters) for a point from
//! `v2/tide/extremes/point`. The API key travels in the `Authorization`
//! header. Stormglass reports failures as an `errors` object mapping a field
//! name to messages, which may arrive with any HTTP status.

mod client;
mod config;
mod payload;

pub use client::{StormglassClient, extremes_query};
pub use config::StormglassConfig;
pub use payload::parse_extremes_body;

/// Provider name used in logs and errors.
pub const PROVIDER_NAME: &str = "stormglass";
