#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config file: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigParseError { .. } | ConfigError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let err = ConfigError::InvalidConfiguration {
            message: "frame_interval_ms must be > 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: frame_interval_ms must be > 0"
        );
        assert_eq!(err.error_code(), "INVALID_CONFIGURATION");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_io_error_is_not_user_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfigError = io_err.into();
        assert_eq!(err.error_code(), "CONFIG_IO_ERROR");
        assert!(!err.is_user_error());
    }
}
