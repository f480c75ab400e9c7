use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки упорядоченного индекса.
///
/// Сам индекс сообщает об исходах через статусы (`InsertStatus`,
/// `DeleteStatus`); эти варианты нужны вызывающему коду, который хочет
/// пробрасывать исход через `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Ключ уже существует, индекс не изменён
    #[error("Key already exists: {key}")]
    KeyExists { key: String },
    /// Ключ отсутствует
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },
    /// Недопустимая максимальная высота башни
    #[error("Invalid max height {value}: must be at least 1")]
    InvalidMaxHeight { value: usize },
    /// Пустой разделитель снапшота
    #[error("Snapshot delimiter must not be empty")]
    EmptyDelimiter,
}

impl ErrorExt for IndexError {
    fn kind(&self) -> &'static str {
        "index"
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::KeyExists { .. } => StatusCode::AlreadyExists,
            Self::KeyNotFound { .. } => StatusCode::NotFound,
            Self::InvalidMaxHeight { .. } | Self::EmptyDelimiter => StatusCode::InvalidArgs,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::KeyExists { .. } => "Key already exists".to_string(),
            Self::KeyNotFound { .. } => "Key not found".to_string(),
            Self::InvalidMaxHeight { .. } | Self::EmptyDelimiter => self.to_string(),
        }
    }
}
