//! Client error types.

use coastwatch_core::LoggingError;
use coastwatch_providers::ProviderError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration file could not be read, parsed or serialized.
    #[error("configuration error: {0}")]
    Config(String),

    /// An unusable setting, or a failed single-section command. Shown as
    /// the notice.
    #[error("{}", .0.notice())]
    Provider(#[from] ProviderError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_display_their_notice() {
        let err = ClientError::from(
            ProviderError::config_missing("api key is empty").with_provider("stormglass"),
        );
        assert_eq!(
            err.to_string(),
            "Missing stormglass configuration: api key is empty"
        );
    }

    #[test]
    fn logging_errors_are_prefixed() {
        let logging = coastwatch_core::LoggingConfig::default().with_filter("coastwatch=loud");
        let err = ClientError::from(coastwatch_core::init_logging(&logging).unwrap_err());
        assert!(err.to_string().starts_with("logging setup failed: invalid log filter"));
    }

    #[test]
    fn config_errors_are_prefixed() {
        let err = ClientError::Config("failed to parse config".into());
        assert_eq!(err.to_string(), "configuration error: failed to parse config");
    }
}
