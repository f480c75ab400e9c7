pub use skipkv_error::{
    ConfigError, ErrorExt, IndexError, LogLevel, SnapshotError, StatusCode,
};
use thiserror::Error;

/// Ошибки инициализации логирования.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    #[error("Invalid logging config: {0}")]
    InvalidConfig(String),
    #[error("Cannot create log directory {path}: {reason}")]
    LogDir { path: String, reason: String },
    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

impl ErrorExt for LoggingError {
    fn kind(&self) -> &'static str {
        "logging"
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidConfig(_) => StatusCode::InvalidConfig,
            Self::LogDir { .. } => StatusCode::Io,
            Self::AlreadyInitialized(_) => StatusCode::Internal,
        }
    }
}
