use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки конфигурации.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Источники конфигурации не удалось прочитать или десериализовать
    #[error("Failed to load configuration: {reason}")]
    Load { reason: String },
    /// Значение поля недопустимо
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn kind(&self) -> &'static str {
        "config"
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidConfig
    }
}
