mod endpoints;
mod messages;

pub use endpoints::{
    FRAME_PATH, LOGS_PATH, STATS_PATH, TEST_NOTIFICATION_PATH, TOGGLE_DETECTION_PATH,
    UPDATE_CHAT_ID_PATH,
};
pub use messages::{
    CommandResponse, ErrorBody, FramePayload, LogEntry, StatsPayload, ToggleResponse,
    UpdateChatIdRequest,
};
