//! Configuration validation logic.

use std::time::Duration;

use crate::errors::ConfigError;
use crate::types::HelmwatchConfig;

/// Validate a HelmwatchConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - `base_url` must be an `http://` or `https://` URL
/// - every period and cooldown must be non-zero
/// - `backoff_factor` must be finite and >= 1.0
/// - `backoff_ceiling_ms` must not be below `frame_interval_ms`
/// - `request_timeout_multiplier` must be >= 1
pub fn validate_config(config: &HelmwatchConfig) -> Result<(), ConfigError> {
    let base_url = config.server.base_url();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(format!(
            "server.base_url must start with http:// or https:// (got '{}')",
            base_url
        )));
    }

    let scheduler = config.scheduler_config();
    let periods = [
        ("polling.frame_interval_ms", scheduler.frame_interval),
        ("polling.logs_interval_ms", scheduler.logs_interval),
        ("commands.button_cooldown_ms", scheduler.button_cooldown),
        ("commands.command_cooldown_ms", scheduler.command_cooldown),
        (
            "commands.notification_duration_ms",
            scheduler.notification_duration,
        ),
        ("server.command_timeout_ms", config.server.command_timeout()),
    ];
    for (name, value) in periods {
        if value == Duration::ZERO {
            return Err(invalid(format!("{} must be > 0", name)));
        }
    }

    if !scheduler.backoff_factor.is_finite() || scheduler.backoff_factor < 1.0 {
        return Err(invalid(format!(
            "polling.backoff_factor must be >= 1.0 (got {})",
            scheduler.backoff_factor
        )));
    }

    if scheduler.backoff_ceiling < scheduler.frame_interval {
        return Err(invalid(
            "polling.backoff_ceiling_ms must be >= polling.frame_interval_ms".to_string(),
        ));
    }

    if scheduler.request_timeout_multiplier == 0 {
        return Err(invalid(
            "polling.request_timeout_multiplier must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn invalid(message: String) -> ConfigError {
    ConfigError::InvalidConfiguration { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PollingConfig, ServerConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&HelmwatchConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = HelmwatchConfig {
            server: ServerConfig {
                base_url: Some("ftp://camera".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("server.base_url"));
    }

    #[test]
    fn test_rejects_shrinking_backoff() {
        let config = HelmwatchConfig {
            polling: PollingConfig {
                backoff_factor: Some(0.5),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("backoff_factor"));
    }

    #[test]
    fn test_rejects_ceiling_below_baseline() {
        let config = HelmwatchConfig {
            polling: PollingConfig {
                frame_interval_ms: Some(6000),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("backoff_ceiling_ms"));
    }

    #[test]
    fn test_rejects_zero_logs_interval() {
        let config = HelmwatchConfig {
            polling: PollingConfig {
                logs_interval_ms: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: polling.logs_interval_ms must be > 0"
        );
    }

    #[test]
    fn test_rejects_zero_timeout_multiplier() {
        let config = HelmwatchConfig {
            polling: PollingConfig {
                request_timeout_multiplier: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
