//! Error types for provider operations.
//!
//! Every failure a provider can produce falls into one of four kinds. The
//! kind decides how the failure is presented: a configuration notice, a
//! transient warning, or an error carrying the upstream's own message.

use std::fmt;

use coastwatch_core::DeviceIdError;
use serde::Serialize;
use thiserror::Error;

/// Classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// A required credential or parameter is absent or malformed.
    ConfigMissing,
    /// Transport failure: timeout, refused connection, truncated body.
    Network,
    /// The provider answered with a structured error.
    UpstreamRejected,
    /// The response did not have the expected shape.
    Decode,
}

impl ProviderErrorKind {
    /// Returns true if the next request may succeed without any change on our side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "config_missing",
            Self::Network => "network",
            Self::UpstreamRejected => "upstream_rejected",
            Self::Decode => "decode",
        }
    }

    /// How loudly this kind should be shown.
    pub fn severity(&self) -> Severity {
        match self {
            Self::ConfigMissing => Severity::Notice,
            Self::Network => Severity::Warning,
            Self::UpstreamRejected | Self::Decode => Severity::Error,
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation level for a failed section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

/// Upstream messages are truncated to this many characters before display.
const MAX_NOTICE_CHARS: usize = 200;

/// An error raised while fetching from a provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    /// Provider that raised the error (`"ecowitt"`, `"stormglass"`).
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ConfigMissing, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Network, message)
    }

    pub fn upstream_rejected(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::UpstreamRejected, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Decode, message)
    }

    /// Sets the provider name.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attaches the underlying error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// User-facing text for this error.
    ///
    /// Only upstream rejections echo a message from outside, and that message
    /// is sanitized first.
    pub fn notice(&self) -> String {
        let provider = self.provider.as_deref().unwrap_or("provider");
        match self.kind {
            ProviderErrorKind::ConfigMissing => {
                format!("Missing {} configuration: {}", provider, self.message)
            }
            ProviderErrorKind::Network => format!(
                "Could not reach {}; will retry on the next request",
                provider
            ),
            ProviderErrorKind::UpstreamRejected => {
                format!("{} error: {}", provider, sanitize(&self.message))
            }
            ProviderErrorKind::Decode => format!("Invalid response from {}", provider),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<DeviceIdError> for ProviderError {
    fn from(err: DeviceIdError) -> Self {
        Self::config_missing(err.to_string()).with_source(err)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Strips control characters, collapses whitespace and caps the length.
fn sanitize(message: &str) -> String {
    let cleaned = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > MAX_NOTICE_CHARS {
        let mut truncated: String = collapsed.chars().take(MAX_NOTICE_CHARS).collect();
        truncated.push('…');
        truncated
    } else {
        collapsed
    }
}
