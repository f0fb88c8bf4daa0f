//! Raw Stormglass payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use coastwatch_core::{TideExtreme, TideKind};
use serde::Deserialize;

use super::PROVIDER_NAME;
use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Deserialize)]
struct ExtremesResponse {
    #[serde(default)]
    data: Option<Vec<RawExtreme>>,
    #[serde(default)]
    errors: Option<BTreeMap<String, ErrorMessages>>,
}

#[derive(Debug, Deserialize)]
struct RawExtreme {
    time: String,
    #[serde(rename = "type")]
    kind: String,
    height: f64,
}

/// Error values are usually a list of messages, occasionally a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessages {
    Many(Vec<String>),
    One(String),
}

impl ErrorMessages {
    fn joined(&self) -> String {
        match self {
            Self::Many(messages) => messages.join(", "),
            Self::One(message) => message.clone(),
        }
    }
}

/// Joins an `errors` object into `"field: msg; field: msg"`, ordered by field.
fn join_errors(errors: &BTreeMap<String, ErrorMessages>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.joined()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extracts the joined `errors` object from a body, if it has one.
pub(crate) fn upstream_errors(body: &str) -> Option<String> {
    let response: ExtremesResponse = serde_json::from_str(body).ok()?;
    response
        .errors
        .filter(|errors| !errors.is_empty())
        .map(|errors| join_errors(&errors))
}

/// Parses a `tide/extremes/point` response body.
///
/// An `errors` object wins over any `data` that came with it.
pub fn parse_extremes_body(body: &str) -> ProviderResult<Vec<TideExtreme>> {
    let response: ExtremesResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::decode(format!("failed to parse response: {}", e))
            .with_provider(PROVIDER_NAME)
            .with_source(e)
    })?;

    if let Some(errors) = response.errors.as_ref().filter(|e| !e.is_empty()) {
        return Err(ProviderError::upstream_rejected(join_errors(errors)).with_provider(PROVIDER_NAME));
    }

    let Some(data) = response.data else {
        return Err(ProviderError::decode("response has no data").with_provider(PROVIDER_NAME));
    };

    data.into_iter().map(RawExtreme::into_extreme).collect()
}

impl RawExtreme {
    fn into_extreme(self) -> ProviderResult<TideExtreme> {
        let time = DateTime::parse_from_rfc3339(&self.time)
            .map_err(|e| {
                ProviderError::decode(format!("invalid extreme time {:?}: {}", self.time, e))
                    .with_provider(PROVIDER_NAME)
            })?
            .with_timezone(&Utc);

        let kind = match self.kind.as_str() {
            "high" => TideKind::High,
            "low" => TideKind::Low,
            other => {
                return Err(ProviderError::decode(format!("unknown extreme type {:?}", other))
                    .with_provider(PROVIDER_NAME));
            }
        };

        Ok(TideExtreme::new(time, kind, self.height))
    }
}
