//! Built-in fallback values for every configurable setting.

pub(crate) const BASE_URL: &str = "http://127.0.0.1:5000";
pub(crate) const COMMAND_TIMEOUT_MS: u64 = 10_000;

/// 10 frames per second.
pub(crate) const FRAME_INTERVAL_MS: u64 = 100;
pub(crate) const LOGS_INTERVAL_MS: u64 = 2_000;
pub(crate) const BACKOFF_FACTOR: f64 = 1.5;
pub(crate) const BACKOFF_CEILING_MS: u64 = 5_000;
pub(crate) const REQUEST_TIMEOUT_MULTIPLIER: u32 = 4;
pub(crate) const MIN_REQUEST_TIMEOUT_MS: u64 = 1_000;

pub(crate) const BUTTON_COOLDOWN_MS: u64 = 1_000;
pub(crate) const COMMAND_COOLDOWN_MS: u64 = 2_000;
pub(crate) const NOTIFICATION_DURATION_MS: u64 = 4_000;
