//! Configuration commands.

use std::path::Path;

use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout, with literal credentials masked.
pub fn dump(config: &AppConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
///
/// Absent provider sections are reported but are not an error. A present
/// section whose credentials or device do not resolve is.
pub fn validate(config: &AppConfig) -> ClientResult<()> {
    let mut problems = Vec::new();

    match config.ecowitt {
        Some(ref settings) => {
            if let Err(e) = config.ecowitt_client() {
                problems.push(format!("[ecowitt] {}", e.message()));
            }
            match settings.mac.as_deref() {
                Some(mac) => {
                    if let Err(e) = coastwatch_core::DeviceId::parse(mac) {
                        problems.push(format!("[ecowitt] {}", e));
                    }
                }
                None => problems.push("[ecowitt] mac is missing".to_string()),
            }
        }
        None => println!("[ecowitt] not configured; weather will show a notice."),
    }

    match config.stormglass {
        Some(ref settings) => {
            if let Err(e) = config.stormglass_client() {
                problems.push(format!("[stormglass] {}", e.message()));
            }
            if settings.location().is_none() {
                problems.push("[stormglass] latitude and longitude are required".to_string());
            }
        }
        None => println!("[stormglass] not configured; tides will show a notice."),
    }

    if let Err(e) = config.pipeline_config() {
        problems.push(format!("[{}] {}", e.provider().unwrap_or("config"), e.message()));
    }

    if problems.is_empty() {
        println!("Configuration is valid.");
        Ok(())
    } else {
        Err(ClientError::Config(problems.join("; ")))
    }
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    let exists = if path.exists() { "" } else { " (not found)" };
    println!("config: {}{}", path.display(), exists);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn empty_config_is_valid() {
        validate(&AppConfig::default()).unwrap();
    }

    #[test]
    fn complete_sections_are_valid() {
        let config = parse(
            r#"
[ecowitt]
application_key = "app"
api_key = "api"
mac = "AABBCCDDEEFF"

[stormglass]
api_key = "sg"
latitude = 50.1
longitude = -5.5
"#,
        );
        validate(&config).unwrap();
    }

    #[test]
    fn problems_are_collected() {
        let config = parse(
            r#"
[ecowitt]
application_key = "app"
mac = "not-a-mac"

[stormglass]
api_key = "sg"
latitude = 50.1

[display]
tide_horizon_hours = 0
"#,
        );
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("[ecowitt] api_key is missing from [ecowitt]"));
        assert!(err.contains("[ecowitt] device identifier must be"), "{}", err);
        assert!(err.contains("[stormglass] latitude and longitude are required"));
        assert!(err.contains("[display] tide horizon must be between 1 and 720 hours"));
    }

    #[test]
    fn out_of_range_windows_are_reported() {
        let config = parse(
            r#"
[display]
tide_horizon_hours = 9223372036854775807

[cache]
history_lookback_days = 4294967295
"#,
        );
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("[display] tide_horizon_hours is out of range"), "{}", err);
    }
}
