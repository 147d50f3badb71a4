use serde::{Deserialize, Serialize};

/// Detection status as last reported by a successful frame poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    Inactive,
    Active,
    ActiveViolation,
}

impl DetectionStatus {
    /// `violation` only matters while detection is active.
    pub fn from_flags(detection_active: bool, violation: bool) -> Self {
        match (detection_active, violation) {
            (false, _) => DetectionStatus::Inactive,
            (true, false) => DetectionStatus::Active,
            (true, true) => DetectionStatus::ActiveViolation,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, DetectionStatus::Inactive)
    }

    pub fn has_violation(self) -> bool {
        matches!(self, DetectionStatus::ActiveViolation)
    }
}

impl std::fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionStatus::Inactive => write!(f, "inactive"),
            DetectionStatus::Active => write!(f, "active"),
            DetectionStatus::ActiveViolation => write!(f, "active_violation"),
        }
    }
}

/// Last known detection status.
///
/// Only successful polls write it. A failed poll leaves the previous value in
/// place (stale but valid) instead of falling back to `Inactive`.
#[derive(Debug, Clone)]
pub struct DetectionState {
    current: DetectionStatus,
}

impl DetectionState {
    pub fn new() -> Self {
        Self {
            current: DetectionStatus::Inactive,
        }
    }

    pub fn current(&self) -> DetectionStatus {
        self.current
    }

    /// Overwrite with the flags of a successful poll. Returns whether the value changed.
    pub fn apply(&mut self, detection_active: bool, violation: bool) -> bool {
        let next = DetectionStatus::from_flags(detection_active, violation);
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

impl Default for DetectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(
            DetectionStatus::from_flags(false, false),
            DetectionStatus::Inactive
        );
        assert_eq!(
            DetectionStatus::from_flags(false, true),
            DetectionStatus::Inactive
        );
        assert_eq!(
            DetectionStatus::from_flags(true, false),
            DetectionStatus::Active
        );
        assert_eq!(
            DetectionStatus::from_flags(true, true),
            DetectionStatus::ActiveViolation
        );
    }

    #[test]
    fn test_apply_overwrites_fully() {
        let mut state = DetectionState::new();
        assert!(state.apply(true, true));
        assert_eq!(state.current(), DetectionStatus::ActiveViolation);
        assert!(state.apply(true, false));
        assert_eq!(state.current(), DetectionStatus::Active);
        assert!(!state.apply(true, false));
    }

    #[test]
    fn test_status_predicates() {
        assert!(!DetectionStatus::Inactive.is_active());
        assert!(DetectionStatus::Active.is_active());
        assert!(DetectionStatus::ActiveViolation.is_active());
        assert!(DetectionStatus::ActiveViolation.has_violation());
        assert!(!DetectionStatus::Active.has_violation());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&DetectionStatus::ActiveViolation).unwrap();
        assert_eq!(json, r#""active_violation""#);
    }
}
