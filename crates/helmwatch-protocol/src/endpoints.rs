//! Endpoint paths exposed by the detection service.

pub const FRAME_PATH: &str = "/api/frame";
pub const LOGS_PATH: &str = "/api/logs";
pub const STATS_PATH: &str = "/api/stats";
pub const TOGGLE_DETECTION_PATH: &str = "/api/toggle_detection";
pub const TEST_NOTIFICATION_PATH: &str = "/api/test_notification";
pub const UPDATE_CHAT_ID_PATH: &str = "/api/update_chat_id";
