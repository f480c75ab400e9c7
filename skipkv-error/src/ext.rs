use std::error::Error;

use crate::{LogLevel, StatusCode};

/// Общее поведение типизированных ошибок skipkv: код статуса, уровень
/// логирования, безопасное сообщение и теги для структурных логов.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Короткое имя подсистемы (`"index"`, `"snapshot"`, ...), попадает в
    /// тег `error_type`.
    fn kind(&self) -> &'static str;

    /// Статус ошибки. По умолчанию [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Уровень логирования, выведенный из статуса.
    fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }

    /// Сообщение без внутренних деталей: для `Internal` только
    /// `"Internal error"`.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Теги (ключ-значение) для полей события.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.kind().to_string()),
            ("status_code", self.status_code().code().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Opaque(&'static str);

    impl fmt::Display for Opaque {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "opaque: {}", self.0)
        }
    }

    impl Error for Opaque {}

    impl ErrorExt for Opaque {
        fn kind(&self) -> &'static str {
            "test"
        }
    }

    #[derive(Debug)]
    struct Missing(&'static str);

    impl fmt::Display for Missing {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "missing: {}", self.0)
        }
    }

    impl Error for Missing {}

    impl ErrorExt for Missing {
        fn kind(&self) -> &'static str {
            "test"
        }

        fn status_code(&self) -> StatusCode {
            StatusCode::NotFound
        }
    }

    /// По умолчанию статус `Internal`, детали скрыты, логируется как error.
    #[test]
    fn test_defaults_hide_internal_details() {
        let e = Opaque("sensitive");

        assert_eq!(e.status_code(), StatusCode::Internal);
        assert_eq!(e.client_message(), "Internal error");
        assert_eq!(e.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_tags_and_level_follow_status() {
        let e = Missing("k");

        assert_eq!(e.client_message(), "missing: k");
        assert_eq!(e.log_level(), LogLevel::Debug);
        assert_eq!(
            e.metrics_tags(),
            vec![
                ("error_type", "test".to_string()),
                ("status_code", "2000".to_string())
            ]
        );
    }
}
