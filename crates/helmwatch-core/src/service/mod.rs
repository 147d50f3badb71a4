//! Access to the remote detection service.
//!
//! The monitor only talks to the service through [`DetectionService`], so
//! tests can drive it with scripted responses instead of a live server.

mod http;

pub use http::HttpDetectionService;

use futures::future::BoxFuture;
use helmwatch_protocol::{FramePayload, LogEntry, StatsPayload, ToggleResponse};

use crate::errors::ServiceError;

/// Operations exposed by the detection service.
///
/// Implementations return [`ServiceError::Remote`] when the service answered
/// but reported a failure in the body (`success: false` or a non-empty
/// `error`), and any other variant when the request itself failed.
pub trait DetectionService: Send + Sync {
    /// Latest frame with detection flags and counters.
    fn fetch_frame(&self) -> BoxFuture<'_, Result<FramePayload, ServiceError>>;

    /// Recent activity log entries, oldest first.
    fn fetch_logs(&self) -> BoxFuture<'_, Result<Vec<LogEntry>, ServiceError>>;

    fn fetch_stats(&self) -> BoxFuture<'_, Result<StatsPayload, ServiceError>>;

    /// Flip detection on the service. The response carries the new state.
    fn toggle_detection(&self) -> BoxFuture<'_, Result<ToggleResponse, ServiceError>>;

    fn test_notification(&self) -> BoxFuture<'_, Result<(), ServiceError>>;

    fn update_chat_id<'a>(&'a self, chat_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>>;
}
