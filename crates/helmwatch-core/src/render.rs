//! Projection of monitor state into display values.
//!
//! Everything here is a pure function of state. Hosts implement [`Renderer`]
//! to put the values on screen; the monitor never depends on rendering
//! succeeding.

use helmwatch_protocol::{FramePayload, LogEntry};
use serde::Serialize;

use crate::state::{ConnectionStatus, DetectionStatus, StatsSnapshot, format_uptime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionIndicator {
    pub label: &'static str,
    pub css_class: &'static str,
}

impl From<ConnectionStatus> for ConnectionIndicator {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connected => Self {
                label: "Connected",
                css_class: "connection-status connected",
            },
            ConnectionStatus::Disconnected => Self {
                label: "Disconnected",
                css_class: "connection-status disconnected",
            },
        }
    }
}

/// Status badge plus the label of the primary toggle control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionIndicator {
    pub label: &'static str,
    pub css_class: &'static str,
    pub button_label: &'static str,
}

impl From<DetectionStatus> for DetectionIndicator {
    fn from(status: DetectionStatus) -> Self {
        match status {
            DetectionStatus::ActiveViolation => Self {
                label: "VIOLATION DETECTED",
                css_class: "status-badge status-danger",
                button_label: "Deactivate Detection",
            },
            DetectionStatus::Active => Self {
                label: "DETECTION ACTIVE",
                css_class: "status-badge status-active",
                button_label: "Deactivate Detection",
            },
            DetectionStatus::Inactive => Self {
                label: "DETECTION INACTIVE",
                css_class: "status-badge status-inactive",
                button_label: "Activate Detection",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub total_detections: u64,
    pub violations: u64,
    pub notifications_sent: u64,
    /// `HH:MM`
    pub uptime: String,
}

impl From<&StatsSnapshot> for StatsView {
    fn from(stats: &StatsSnapshot) -> Self {
        Self {
            total_detections: stats.total_detections,
            violations: stats.violations,
            notifications_sent: stats.notifications_sent,
            uptime: format_uptime(stats.uptime_seconds),
        }
    }
}

/// Display surface for the monitor.
///
/// Every method defaults to a no-op, so a host only implements the surfaces
/// it actually has.
pub trait Renderer: Send + Sync {
    fn render_connection(&self, _indicator: &ConnectionIndicator) {}

    fn render_detection(&self, _indicator: &DetectionIndicator) {}

    fn render_frame(&self, _payload: &FramePayload) {}

    fn render_stats(&self, _stats: &StatsView) {}

    /// Full log list as returned by the service, oldest first.
    fn render_logs(&self, _logs: &[LogEntry]) {}

    /// Names of surfaces this renderer cannot show. Reported once when the
    /// monitor starts; the affected updates are simply dropped.
    fn missing_surfaces(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

/// Renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_labels() {
        let connected = ConnectionIndicator::from(ConnectionStatus::Connected);
        assert_eq!(connected.label, "Connected");
        assert_eq!(connected.css_class, "connection-status connected");
        let disconnected = ConnectionIndicator::from(ConnectionStatus::Disconnected);
        assert_eq!(disconnected.label, "Disconnected");
    }

    #[test]
    fn test_detection_labels_follow_status() {
        let violation = DetectionIndicator::from(DetectionStatus::ActiveViolation);
        assert_eq!(violation.label, "VIOLATION DETECTED");
        assert_eq!(violation.button_label, "Deactivate Detection");

        let active = DetectionIndicator::from(DetectionStatus::Active);
        assert_eq!(active.label, "DETECTION ACTIVE");
        assert_eq!(active.css_class, "status-badge status-active");

        let inactive = DetectionIndicator::from(DetectionStatus::Inactive);
        assert_eq!(inactive.label, "DETECTION INACTIVE");
        assert_eq!(inactive.button_label, "Activate Detection");
    }

    #[test]
    fn test_stats_view_formats_uptime() {
        let snapshot = StatsSnapshot {
            total_detections: 12,
            violations: 3,
            notifications_sent: 2,
            uptime_seconds: 7_380,
        };
        let view = StatsView::from(&snapshot);
        assert_eq!(view.uptime, "02:03");
        assert_eq!(view.total_detections, 12);
    }

    #[test]
    fn test_null_renderer_has_every_surface() {
        assert!(NullRenderer.missing_surfaces().is_empty());
    }
}
