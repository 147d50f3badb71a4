use base64::Engine;
use serde::{Deserialize, Serialize};

/// Response body of `GET /api/frame`.
///
/// The service omits `frame` (and answers 503) when the camera has not
/// produced an image yet. Any non-empty `error` marks the poll as failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePayload {
    /// Base64-encoded JPEG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    #[serde(default)]
    pub detection_active: bool,
    #[serde(default)]
    pub violation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FramePayload {
    /// The logical failure carried by a 2xx body, if any.
    pub fn logical_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Whether the payload carries an image.
    pub fn has_frame(&self) -> bool {
        self.frame.as_deref().is_some_and(|f| !f.is_empty())
    }

    /// Decode the base64 frame into raw JPEG bytes.
    ///
    /// Returns `Ok(None)` when the payload has no frame.
    pub fn decode_frame(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        match self.frame.as_deref() {
            Some(frame) if !frame.is_empty() => base64::engine::general_purpose::STANDARD
                .decode(frame)
                .map(Some),
            _ => Ok(None),
        }
    }
}

/// Aggregate counters reported alongside every frame and by `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub violations_detected: u64,
    #[serde(default)]
    pub notifications_sent: u64,
    /// Seconds since the service started.
    #[serde(default)]
    pub uptime: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_chat_id: Option<String>,
}

/// One line of the service activity log (`GET /api/logs`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

/// Response body of `POST /api/toggle_detection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub detection_active: bool,
}

/// Response body of `POST /api/test_notification` and `POST /api/update_chat_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    /// Collapse the payload into a result; `success: false` becomes the error message.
    pub fn into_result(self) -> Result<(), String> {
        if self.success {
            return Ok(());
        }
        Err(self
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "unknown error".to_string()))
    }
}

/// Request body of `POST /api/update_chat_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateChatIdRequest {
    pub chat_id: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
