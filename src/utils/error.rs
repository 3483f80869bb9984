use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Service responded with status {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Unexpected payload: {message}")]
    PayloadError { message: String },

    #[error("Stream error: {message}")]
    StreamError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    Payload,
    Configuration,
    Validation,
    Io,
}

impl DemoError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DemoError::ApiError(_) => ErrorCategory::Network,
            DemoError::ServiceError { .. } => ErrorCategory::Service,
            DemoError::PayloadError { .. }
            | DemoError::StreamError { .. }
            | DemoError::SerializationError(_) => ErrorCategory::Payload,
            DemoError::ConfigError { .. } | DemoError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            DemoError::ValidationError { .. } => ErrorCategory::Validation,
            DemoError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DemoError::ApiError(_) => "Check network connectivity and the configured base URL",
            DemoError::ServiceError { status: 401 | 403, .. } => {
                "Check that the API key is valid and has access to this endpoint"
            }
            DemoError::ServiceError { .. } => "The service rejected the request; try again later",
            DemoError::PayloadError { .. }
            | DemoError::StreamError { .. }
            | DemoError::SerializationError(_) => {
                "The service returned data in an unexpected format"
            }
            DemoError::ConfigError { .. } | DemoError::InvalidConfigValueError { .. } => {
                "Review the command-line flags and the TOML configuration file"
            }
            DemoError::ValidationError { .. } => "Provide the required value and run again",
            DemoError::IoError(_) => "Check console and file permissions",
        }
    }

    /// 只保留訊息本身，不含分類前綴
    pub fn message(&self) -> String {
        match self {
            DemoError::ValidationError { message } | DemoError::ConfigError { message } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
