use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Single source of truth for whether the service is reachable.
///
/// Starts disconnected: nothing has been observed yet.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    status: ConnectionStatus,
    changed_at: Option<Instant>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            changed_at: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// When the last transition happened. `None` until the first one.
    pub fn changed_at(&self) -> Option<Instant> {
        self.changed_at
    }

    /// Record the latest observation.
    ///
    /// Returns the new status only when it differs from the current one, so
    /// callers run their transition side effects exactly once per change.
    pub fn set_connected(&mut self, connected: bool) -> Option<ConnectionStatus> {
        let next = if connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        if next == self.status {
            return None;
        }
        self.status = next;
        self.changed_at = Some(Instant::now());
        Some(next)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let state = ConnectionState::new();
        assert_eq!(state.status(), ConnectionStatus::Disconnected);
        assert!(!state.is_connected());
        assert!(state.changed_at().is_none());
    }

    #[test]
    fn test_transition_reported_once() {
        let mut state = ConnectionState::new();
        assert_eq!(
            state.set_connected(true),
            Some(ConnectionStatus::Connected)
        );
        assert_eq!(state.set_connected(true), None);
        assert!(state.is_connected());
        assert!(state.changed_at().is_some());
    }

    #[test]
    fn test_failure_while_disconnected_is_not_a_transition() {
        let mut state = ConnectionState::new();
        assert_eq!(state.set_connected(false), None);
        assert!(state.changed_at().is_none());
    }

    #[test]
    fn test_round_trip_transitions() {
        let mut state = ConnectionState::new();
        state.set_connected(true);
        assert_eq!(
            state.set_connected(false),
            Some(ConnectionStatus::Disconnected)
        );
        assert_eq!(
            state.set_connected(true),
            Some(ConnectionStatus::Connected)
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Connected.to_string(), "connected");
        assert_eq!(ConnectionStatus::Disconnected.to_string(), "disconnected");
    }
}
