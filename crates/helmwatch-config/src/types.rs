//! Configuration type definitions for helmwatch.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "http://192.168.1.20:5000"
//! command_timeout_ms = 10000
//!
//! [polling]
//! frame_interval_ms = 100
//! logs_interval_ms = 2000
//! backoff_factor = 1.5
//! backoff_ceiling_ms = 5000
//!
//! [commands]
//! button_cooldown_ms = 1000
//! notification_duration_ms = 4000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.helmwatch/config.toml`
/// 2. Project config: `./.helmwatch/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmwatchConfig {
    /// `[server]` section: where the detection service lives.
    pub server: ServerConfig,
    /// `[polling]` section: frame/log poll periods and backoff.
    pub polling: PollingConfig,
    /// `[commands]` section: one-shot control actions.
    pub commands: CommandConfig,
}

impl HelmwatchConfig {
    /// Resolve every scheduling-related setting against its default.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            frame_interval: self.polling.frame_interval(),
            logs_interval: self.polling.logs_interval(),
            backoff_factor: self.polling.backoff_factor(),
            backoff_ceiling: self.polling.backoff_ceiling(),
            request_timeout_multiplier: self.polling.request_timeout_multiplier(),
            min_request_timeout: self.polling.min_request_timeout(),
            button_cooldown: self.commands.button_cooldown(),
            command_cooldown: self.commands.command_cooldown(),
            notification_duration: self.commands.notification_duration(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the detection service.
    /// Default: `"http://127.0.0.1:5000"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Timeout applied to toggle/test-notification/chat-id requests.
    /// Default: 10000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_ms: Option<u64>,
}

impl ServerConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(defaults::BASE_URL)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(
            self.command_timeout_ms
                .unwrap_or(defaults::COMMAND_TIMEOUT_MS),
        )
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            base_url: override_config
                .base_url
                .clone()
                .or_else(|| base.base_url.clone()),
            command_timeout_ms: override_config
                .command_timeout_ms
                .or(base.command_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Baseline frame poll period. Backoff always resets to this value.
    /// Default: 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_interval_ms: Option<u64>,

    /// Activity log poll period. Never affected by backoff.
    /// Default: 2000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_interval_ms: Option<u64>,

    /// Multiplier applied to the frame period on every failed poll.
    /// Default: 1.5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<f64>,

    /// Upper bound for the backed-off frame period.
    /// Default: 5000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_ceiling_ms: Option<u64>,

    /// Poll requests time out after this many task periods.
    /// Default: 4
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_multiplier: Option<u32>,

    /// Floor for the per-request poll timeout.
    /// Default: 1000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_request_timeout_ms: Option<u64>,
}

impl PollingConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.unwrap_or(defaults::FRAME_INTERVAL_MS))
    }

    pub fn logs_interval(&self) -> Duration {
        Duration::from_millis(self.logs_interval_ms.unwrap_or(defaults::LOGS_INTERVAL_MS))
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor.unwrap_or(defaults::BACKOFF_FACTOR)
    }

    pub fn backoff_ceiling(&self) -> Duration {
        Duration::from_millis(
            self.backoff_ceiling_ms
                .unwrap_or(defaults::BACKOFF_CEILING_MS),
        )
    }

    pub fn request_timeout_multiplier(&self) -> u32 {
        self.request_timeout_multiplier
            .unwrap_or(defaults::REQUEST_TIMEOUT_MULTIPLIER)
    }

    pub fn min_request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.min_request_timeout_ms
                .unwrap_or(defaults::MIN_REQUEST_TIMEOUT_MS),
        )
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            frame_interval_ms: override_config
                .frame_interval_ms
                .or(base.frame_interval_ms),
            logs_interval_ms: override_config.logs_interval_ms.or(base.logs_interval_ms),
            backoff_factor: override_config.backoff_factor.or(base.backoff_factor),
            backoff_ceiling_ms: override_config
                .backoff_ceiling_ms
                .or(base.backoff_ceiling_ms),
            request_timeout_multiplier: override_config
                .request_timeout_multiplier
                .or(base.request_timeout_multiplier),
            min_request_timeout_ms: override_config
                .min_request_timeout_ms
                .or(base.min_request_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Busy period of the toggle control after its response arrives.
    /// Default: 1000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_cooldown_ms: Option<u64>,

    /// Busy period of the test-notification and chat-id controls.
    /// Default: 2000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_cooldown_ms: Option<u64>,

    /// How long a notification stays on screen.
    /// Default: 4000
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_duration_ms: Option<u64>,
}

impl CommandConfig {
    pub fn button_cooldown(&self) -> Duration {
        Duration::from_millis(
            self.button_cooldown_ms
                .unwrap_or(defaults::BUTTON_COOLDOWN_MS),
        )
    }

    pub fn command_cooldown(&self) -> Duration {
        Duration::from_millis(
            self.command_cooldown_ms
                .unwrap_or(defaults::COMMAND_COOLDOWN_MS),
        )
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(
            self.notification_duration_ms
                .unwrap_or(defaults::NOTIFICATION_DURATION_MS),
        )
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            button_cooldown_ms: override_config
                .button_cooldown_ms
                .or(base.button_cooldown_ms),
            command_cooldown_ms: override_config
                .command_cooldown_ms
                .or(base.command_cooldown_ms),
            notification_duration_ms: override_config
                .notification_duration_ms
                .or(base.notification_duration_ms),
        }
    }
}

/// Fully resolved scheduling settings.
///
/// `frame_interval` is the baseline the adaptive rate controller starts from
/// and resets to; the live (possibly backed-off) value is owned by the
/// controller. Everything else is constant for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub frame_interval: Duration,
    pub logs_interval: Duration,
    pub backoff_factor: f64,
    pub backoff_ceiling: Duration,
    pub request_timeout_multiplier: u32,
    pub min_request_timeout: Duration,
    pub button_cooldown: Duration,
    pub command_cooldown: Duration,
    pub notification_duration: Duration,
}

impl SchedulerConfig {
    /// Timeout for a single poll request issued by a task running at `interval`.
    pub fn request_timeout(&self, interval: Duration) -> Duration {
        (interval * self.request_timeout_multiplier).max(self.min_request_timeout)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        HelmwatchConfig::default().scheduler_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_timings() {
        let config = SchedulerConfig::default();
        assert_eq!(config.frame_interval, Duration::from_millis(100));
        assert_eq!(config.logs_interval, Duration::from_millis(2000));
        assert_eq!(config.backoff_factor, 1.5);
        assert_eq!(config.backoff_ceiling, Duration::from_millis(5000));
        assert_eq!(config.button_cooldown, Duration::from_millis(1000));
        assert_eq!(config.command_cooldown, Duration::from_millis(2000));
        assert_eq!(config.notification_duration, Duration::from_millis(4000));
    }

    #[test]
    fn test_request_timeout_has_floor() {
        let config = SchedulerConfig::default();
        // 4 x 100ms is below the 1s floor
        assert_eq!(
            config.request_timeout(Duration::from_millis(100)),
            Duration::from_secs(1)
        );
        assert_eq!(
            config.request_timeout(Duration::from_millis(2000)),
            Duration::from_secs(8)
        );
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: HelmwatchConfig = toml::from_str(
            r#"
            [server]
            base_url = "http://camera.local:5000"

            [polling]
            logs_interval_ms = 3000
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url(), "http://camera.local:5000");
        assert_eq!(config.polling.logs_interval(), Duration::from_millis(3000));
        assert_eq!(config.polling.frame_interval(), Duration::from_millis(100));
        assert_eq!(config.commands.button_cooldown(), Duration::from_millis(1000));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: HelmwatchConfig = toml::from_str("").unwrap();
        assert_eq!(config, HelmwatchConfig::default());
        assert_eq!(config.server.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_polling_merge_prefers_override() {
        let base = PollingConfig {
            frame_interval_ms: Some(200),
            logs_interval_ms: Some(4000),
            ..Default::default()
        };
        let override_config = PollingConfig {
            frame_interval_ms: Some(50),
            ..Default::default()
        };
        let merged = PollingConfig::merge(&base, &override_config);
        assert_eq!(merged.frame_interval_ms, Some(50));
        assert_eq!(merged.logs_interval_ms, Some(4000));
        assert_eq!(merged.backoff_factor, None);
    }

    #[test]
    fn test_serialize_skips_unset_fields() {
        let config = HelmwatchConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"server":{},"polling":{},"commands":{}}"#);
    }
}
