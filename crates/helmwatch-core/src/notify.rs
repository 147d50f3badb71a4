//! Transient user-facing messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// A message shown to the user for `duration`, then dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub duration: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            duration,
        }
    }
}

/// Where notifications go. Implementations own their own dismissal.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        let duration_ms = notification.duration.as_millis() as u64;
        match notification.level {
            NotificationLevel::Error => error!(
                event = "core.notify.shown",
                level = "error",
                message = %notification.message,
                duration_ms = duration_ms,
            ),
            NotificationLevel::Warning => warn!(
                event = "core.notify.shown",
                level = "warning",
                message = %notification.message,
                duration_ms = duration_ms,
            ),
            NotificationLevel::Success | NotificationLevel::Info => info!(
                event = "core.notify.shown",
                level = ?notification.level,
                message = %notification.message,
                duration_ms = duration_ms,
            ),
        }
    }
}
