use std::{env, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::LoggingError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Формат вывода событий.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный человекочитаемый вывод
    Pretty,
    /// Одна строка на событие
    #[default]
    Compact,
    /// JSON, одна запись на строку
    Json,
}

/// Настройки подсистемы логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень по умолчанию (`RUST_LOG` имеет приоритет)
    pub level: String,
    pub format: LogFormat,
    pub console_enabled: bool,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub file_enabled: bool,
    /// Каталог для файлового вывода
    pub log_dir: PathBuf,
    /// Префикс имени файла; суффикс с датой добавляет ротация
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            console_enabled: true,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            file_enabled: false,
            log_dir: PathBuf::from("logs"),
            file_name: "skipkv.log".to_string(),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::InvalidConfig(format!(
                "unknown log format '{other}'"
            ))),
        }
    }
}

impl LoggingConfig {
    /// Создаёт конфигурацию с заданным уровнем.
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Переопределяет поля из переменных `SKIPKV_LOG_*`. Некорректные
    /// значения игнорируются.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("SKIPKV_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = env::var("SKIPKV_LOG_FORMAT")
            .ok()
            .and_then(|f| f.parse().ok())
        {
            self.format = format;
        }
        if let Some(enabled) = env_flag("SKIPKV_LOG_CONSOLE") {
            self.console_enabled = enabled;
        }
        if let Some(enabled) = env_flag("SKIPKV_LOG_FILE") {
            self.file_enabled = enabled;
        }
        if let Ok(dir) = env::var("SKIPKV_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(ansi) = env_flag("SKIPKV_LOG_ANSI") {
            self.with_ansi = ansi;
        }
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(LoggingError::InvalidConfig(format!(
                "unknown log level '{}'",
                self.level
            )));
        }

        if self.file_enabled && self.file_name.trim().is_empty() {
            return Err(LoggingError::InvalidConfig(
                "file logging enabled with empty file name".to_string(),
            ));
        }

        Ok(())
    }

    /// Директива фильтра: уровень для всего процесса.
    pub fn build_filter_directive(&self) -> String {
        self.level.to_ascii_lowercase()
    }

    pub fn ensure_log_dir(&self) -> Result<(), LoggingError> {
        if self.file_enabled {
            std::fs::create_dir_all(&self.log_dir).map_err(|e| LoggingError::LogDir {
                path: self.log_dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

fn env_flag(name: &str) -> Option<bool> {
    match env::var(name).ok()?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for var in [
            "SKIPKV_LOG_LEVEL",
            "SKIPKV_LOG_FORMAT",
            "SKIPKV_LOG_CONSOLE",
            "SKIPKV_LOG_FILE",
            "SKIPKV_LOG_DIR",
            "SKIPKV_LOG_ANSI",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = LoggingConfig::default();

        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.build_filter_directive(), "info");
        assert!(!cfg.file_enabled);
    }

    #[test]
    fn test_invalid_level() {
        let cfg = LoggingConfig::with_level("loud");

        assert!(matches!(
            cfg.validate(),
            Err(LoggingError::InvalidConfig(msg)) if msg.contains("loud")
        ));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("SKIPKV_LOG_LEVEL", "debug");
        env::set_var("SKIPKV_LOG_FORMAT", "json");
        env::set_var("SKIPKV_LOG_FILE", "true");
        env::set_var("SKIPKV_LOG_CONSOLE", "off");
        env::set_var("SKIPKV_LOG_DIR", "/tmp/skipkv-logs");

        let mut cfg = LoggingConfig::default();
        cfg.apply_env_overrides();
        clear_env();

        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.format, LogFormat::Json);
        assert!(cfg.file_enabled);
        assert!(!cfg.console_enabled);
        assert_eq!(cfg.log_dir, PathBuf::from("/tmp/skipkv-logs"));
    }

    #[test]
    #[serial]
    fn test_env_garbage_ignored() {
        clear_env();
        env::set_var("SKIPKV_LOG_FORMAT", "xml");
        env::set_var("SKIPKV_LOG_FILE", "maybe");

        let mut cfg = LoggingConfig::default();
        cfg.apply_env_overrides();
        clear_env();

        assert_eq!(cfg, LoggingConfig::default());
    }
}
