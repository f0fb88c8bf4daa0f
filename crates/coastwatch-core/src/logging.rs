//! Logging setup shared by every coastwatch binary.
//!
//! Logs always go to stderr so that stdout can carry JSON view output.
//! `RUST_LOG` takes precedence over the configured level.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to install tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human output (default).
    #[default]
    Compact,
    /// Multi-line output with source locations.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level applied to coastwatch crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: LogFormat,
    /// Explicit filter directive; overrides both `level` and `RUST_LOG`.
    pub filter: Option<String>,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            filter: None,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// Verbose settings used by `--debug`.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            with_target: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Default directive covering every `coastwatch_*` crate.
    fn default_directive(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        [
            "coastwatch",
            "coastwatch_core",
            "coastwatch_providers",
            "coastwatch_pipeline",
            "coastwatch_cli",
        ]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Some(ref directive) = self.filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive())))
    }
}

/// Installs the global subscriber. Call once, early in `main`.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(config.with_target);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(config.with_target);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(config.with_target);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_quiet() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.filter.is_none());
    }

    #[test]
    fn debug_preset() {
        let config = LoggingConfig::debug().with_format(LogFormat::Json);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.with_target);
    }

    #[test]
    fn default_directive_covers_all_crates() {
        let directive = LoggingConfig::debug().default_directive();
        assert!(directive.contains("coastwatch_pipeline=debug"));
        assert!(directive.contains("coastwatch_providers=debug"));
    }

    #[test]
    fn explicit_filter_is_validated() {
        let config = LoggingConfig::default().with_filter("coastwatch=loudest");
        assert!(config.env_filter().is_err());

        let config = LoggingConfig::default().with_filter("coastwatch_pipeline=trace");
        assert!(config.env_filter().is_ok());
    }
}
