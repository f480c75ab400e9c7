use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use skipkv_error::ConfigError;

use crate::{database::IndexOptions, logging::LoggingConfig};

/// Имя необязательного файла конфигурации (без расширения).
pub const DEFAULT_CONFIG_NAME: &str = "skipkv";

/// Настройки приложения.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Максимальная высота башни индекса
    pub max_height: usize,
    /// Путь к файлу снапшота
    pub store_path: PathBuf,
    /// Разделитель ключа и значения в снапшоте
    pub delimiter: String,
    /// Уровень логирования
    pub log_level: String,
    /// Seed генератора высоты; без него используется генератор потока
    pub seed: Option<u64>,
}

impl Settings {
    /// Загружает настройки из `skipkv.{toml,yaml,json}` в текущем каталоге
    /// (если есть) и переменных окружения `SKIPKV_*`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(DEFAULT_CONFIG_NAME).required(false))
    }

    /// Как [`Settings::load`], но файл задан явно и обязателен.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(File::from(path.as_ref()).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let cfg = Config::builder()
            // Значения по умолчанию
            .set_default("max_height", 10)
            .and_then(|b| b.set_default("store_path", "store/dumpFile.txt"))
            .and_then(|b| b.set_default("delimiter", ":"))
            .and_then(|b| b.set_default("log_level", "info"))
            .map_err(load_error)?
            .add_source(file)
            // Переменные окружения с префиксом SKIPKV_
            .add_source(Environment::with_prefix("SKIPKV").try_parsing(true))
            .build()
            .map_err(load_error)?;

        let settings: Self = cfg.try_deserialize().map_err(load_error)?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_height == 0 {
            return Err(ConfigError::invalid("max_height", "must be at least 1"));
        }

        if self.delimiter.is_empty() {
            return Err(ConfigError::invalid("delimiter", "must not be empty"));
        }

        LoggingConfig::with_level(self.log_level.as_str())
            .validate()
            .map_err(|e| ConfigError::invalid("log_level", e.to_string()))?;

        Ok(())
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            max_height: self.max_height,
            delimiter: self.delimiter.clone(),
            seed: self.seed,
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::with_level(self.log_level.as_str())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_height: 10,
            store_path: PathBuf::from("store/dumpFile.txt"),
            delimiter: ":".to_string(),
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

fn load_error(err: config::ConfigError) -> ConfigError {
    ConfigError::Load {
        reason: err.to_string(),
    }
}
