use std::error::Error;

/// Base trait for all application errors
pub trait HelmwatchError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Failure talking to the detection service.
///
/// Everything except [`ServiceError::Remote`] is a transport failure. Both
/// kinds count as a failed poll; only command actions distinguish them.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid service URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Remote(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl ServiceError {
    /// Whether the service answered 2xx but reported a failure in the payload.
    pub fn is_logical(&self) -> bool {
        matches!(self, ServiceError::Remote(_))
    }
}

impl HelmwatchError for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidUrl { .. } => "SERVICE_INVALID_URL",
            ServiceError::Transport(_) => "SERVICE_TRANSPORT_FAILED",
            ServiceError::Http { .. } => "SERVICE_HTTP_ERROR",
            ServiceError::Remote(_) => "SERVICE_REMOTE_ERROR",
            ServiceError::Decode(_) => "SERVICE_DECODE_FAILED",
            ServiceError::Timeout { .. } => "SERVICE_TIMEOUT",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ServiceError::InvalidUrl { .. })
    }
}

/// Why a command action did not reach or satisfy the service.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("chat id must not be empty")]
    EmptyChatId,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl HelmwatchError for CommandError {
    fn error_code(&self) -> &'static str {
        match self {
            CommandError::EmptyChatId => "COMMAND_EMPTY_CHAT_ID",
            CommandError::Service(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            CommandError::EmptyChatId => true,
            CommandError::Service(e) => e.is_user_error(),
        }
    }
}

impl HelmwatchError for helmwatch_config::ConfigError {
    fn error_code(&self) -> &'static str {
        helmwatch_config::ConfigError::error_code(self)
    }

    fn is_user_error(&self) -> bool {
        helmwatch_config::ConfigError::is_user_error(self)
    }
}
