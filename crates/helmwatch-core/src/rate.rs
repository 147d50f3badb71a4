//! Frame poll interval backoff.
//!
//! Every failed frame poll multiplies the interval by the backoff factor up to
//! the ceiling (`100 → 150 → 225 → 337.5 → … → 5000` with the defaults). A
//! single successful poll after a disconnect puts it straight back to the
//! baseline; there is no gradual ramp-down.
//!
//! Intervals are kept at nanosecond precision, so the fourth step is exactly
//! 337.5ms rather than a rounded millisecond value.

use std::time::Duration;

use helmwatch_config::SchedulerConfig;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AdaptiveRateController {
    baseline: Duration,
    ceiling: Duration,
    factor: f64,
    current: Duration,
}

impl AdaptiveRateController {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            baseline: config.frame_interval,
            ceiling: config.backoff_ceiling,
            factor: config.backoff_factor,
            current: config.frame_interval,
        }
    }

    /// The live frame interval.
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn baseline(&self) -> Duration {
        self.baseline
    }

    pub fn is_backed_off(&self) -> bool {
        self.current != self.baseline
    }

    /// Escalate after a failed poll. Returns the new interval if it changed.
    ///
    /// Once the ceiling is reached the value stops changing and `None` is
    /// returned, so callers do not restart timers for nothing.
    pub fn on_failure(&mut self) -> Option<Duration> {
        let scaled_nanos = (self.current.as_nanos() as f64 * self.factor).round() as u64;
        let next = Duration::from_nanos(scaled_nanos).min(self.ceiling);
        if next == self.current {
            debug!(
                event = "core.rate.backoff_capped",
                interval_ms = millis(self.current),
            );
            return None;
        }
        info!(
            event = "core.rate.backoff_applied",
            from_ms = millis(self.current),
            to_ms = millis(next),
        );
        self.current = next;
        Some(next)
    }

    /// Return to the baseline. Returns the new interval if it changed.
    pub fn reset(&mut self) -> Option<Duration> {
        if self.current == self.baseline {
            return None;
        }
        info!(
            event = "core.rate.reset_applied",
            from_ms = millis(self.current),
            to_ms = millis(self.baseline),
        );
        self.current = self.baseline;
        Some(self.baseline)
    }
}

pub(crate) fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> AdaptiveRateController {
        AdaptiveRateController::new(&SchedulerConfig::default())
    }

    #[test]
    fn test_starts_at_baseline() {
        let rate = controller();
        assert_eq!(rate.current(), Duration::from_millis(100));
        assert!(!rate.is_backed_off());
    }

    #[test]
    fn test_backoff_sequence() {
        let mut rate = controller();
        assert_eq!(rate.on_failure(), Some(Duration::from_millis(150)));
        assert_eq!(rate.on_failure(), Some(Duration::from_millis(225)));
        assert_eq!(rate.on_failure(), Some(Duration::from_micros(337_500)));
        assert!(rate.is_backed_off());
    }

    #[test]
    fn test_backoff_matches_closed_form_and_caps() {
        let mut rate = controller();
        let mut previous = rate.current();
        for k in 1..=20 {
            rate.on_failure();
            let expected_ms = (100.0 * 1.5_f64.powi(k)).min(5000.0);
            let actual_ms = millis(rate.current());
            assert!(
                (actual_ms - expected_ms).abs() < 1e-3,
                "failure {}: expected {}ms, got {}ms",
                k,
                expected_ms,
                actual_ms
            );
            assert!(rate.current() >= previous);
            previous = rate.current();
        }
        assert_eq!(rate.current(), Duration::from_millis(5000));
    }

    #[test]
    fn test_capped_failure_reports_no_change() {
        let mut rate = controller();
        while rate.on_failure().is_some() {}
        assert_eq!(rate.current(), Duration::from_millis(5000));
        assert_eq!(rate.on_failure(), None);
    }

    #[test]
    fn test_single_reset_restores_baseline() {
        let mut rate = controller();
        for _ in 0..6 {
            rate.on_failure();
        }
        assert_eq!(rate.reset(), Some(Duration::from_millis(100)));
        assert_eq!(rate.current(), Duration::from_millis(100));
        assert_eq!(rate.reset(), None);
    }

    #[test]
    fn test_custom_factor_and_ceiling() {
        let config = SchedulerConfig {
            frame_interval: Duration::from_millis(200),
            backoff_factor: 2.0,
            backoff_ceiling: Duration::from_millis(700),
            ..SchedulerConfig::default()
        };
        let mut rate = AdaptiveRateController::new(&config);
        assert_eq!(rate.on_failure(), Some(Duration::from_millis(400)));
        assert_eq!(rate.on_failure(), Some(Duration::from_millis(700)));
        assert_eq!(rate.on_failure(), None);
    }
}
