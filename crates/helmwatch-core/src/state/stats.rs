use helmwatch_protocol::StatsPayload;
use serde::{Deserialize, Serialize};

/// Read-only projection of the service counters for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_detections: u64,
    pub violations: u64,
    pub notifications_sent: u64,
    pub uptime_seconds: u64,
}

impl From<&StatsPayload> for StatsSnapshot {
    fn from(payload: &StatsPayload) -> Self {
        let uptime = if payload.uptime.is_finite() && payload.uptime > 0.0 {
            payload.uptime as u64
        } else {
            0
        };
        Self {
            total_detections: payload.total_detections,
            violations: payload.violations_detected,
            notifications_sent: payload.notifications_sent,
            uptime_seconds: uptime,
        }
    }
}

/// Format an uptime as zero-padded `HH:MM`. Hours are not wrapped at 24.
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{:02}:{:02}", hours, minutes)
}
