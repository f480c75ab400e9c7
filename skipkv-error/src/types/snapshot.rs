use std::io;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки загрузки и выгрузки текстового снапшота.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// Файл назначения не удалось открыть
    #[error("Snapshot unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },
    /// Ошибка чтения или записи уже открытого файла
    #[error("Snapshot I/O error at {path}: {reason}")]
    Io { path: String, reason: String },
    /// Строка без разделителя, с пустым ключом или с неразбираемым
    /// ключом/значением
    #[error("Malformed snapshot line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
}

impl SnapshotError {
    pub fn unavailable(
        path: impl Into<String>,
        err: &io::Error,
    ) -> Self {
        Self::Unavailable {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn io(
        path: impl Into<String>,
        err: &io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub fn malformed(
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedLine {
            line,
            reason: reason.into(),
        }
    }
}

impl ErrorExt for SnapshotError {
    fn kind(&self) -> &'static str {
        "snapshot"
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unavailable { .. } => StatusCode::StorageUnavailable,
            Self::Io { .. } => StatusCode::Io,
            Self::MalformedLine { .. } => StatusCode::InvalidData,
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", self.kind().to_string()),
            ("status_code", self.status_code().code().to_string()),
        ];

        if let Self::Unavailable { path, .. } | Self::Io { path, .. } = self {
            tags.push(("path", path.clone()));
        }

        tags
    }
}
