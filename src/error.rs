use std::error::Error;
use std::fmt;

use warp::http::StatusCode;

#[derive(Debug)]
pub enum RustyTasksError {
    // Auth gate errors
    MissingToken,
    MalformedHeader,
    InvalidToken,

    // Authorization errors
    Forbidden,

    // Login errors
    InvalidCredentials,
    AccountNotVerified,

    // Resource errors
    NotFound(String),
    ConflictError(String),

    // Validation errors
    ValidationError(String),

    // Storage errors
    StorageError(String),

    // Configuration errors
    ConfigError(String),

    // System errors
    SystemError(String),
}

impl RustyTasksError {
    /// Machine-readable code sent to clients alongside the message
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::MalformedHeader => "MALFORMED_HEADER",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConflictError(_) => "CONFLICT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::SystemError(_) => "SYSTEM_ERROR",
        }
    }

    /// HTTP status used when this error terminates a request
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken
            | Self::MalformedHeader
            | Self::InvalidToken
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccountNotVerified => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ConflictError(_) => StatusCode::CONFLICT,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::StorageError(_) | Self::ConfigError(_) | Self::SystemError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to a client. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::StorageError(_) | Self::ConfigError(_) | Self::SystemError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RustyTasksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "Missing authorization token"),
            Self::MalformedHeader => write!(f, "Malformed authorization header"),
            Self::InvalidToken => write!(f, "Invalid or expired token"),
            Self::Forbidden => write!(f, "Forbidden: insufficient permissions"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::AccountNotVerified => write!(f, "Account email has not been verified"),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::ConflictError(msg) => write!(f, "Conflict: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
        }
    }
}

impl Error for RustyTasksError {}

impl warp::reject::Reject for RustyTasksError {}

// Generic result type for RustyTasks
pub type Result<T> = std::result::Result<T, RustyTasksError>;
