use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::{config::LoggingConfig, formatter};

/// Файловый layer с ежедневной ротацией. Запись идёт через неблокирующий
/// writer; guard нужно держать живым до завершения процесса.
pub fn layer_with_config<S>(
    config: &LoggingConfig
) -> (Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let file_appender = rolling::daily(&config.log_dir, &config.file_name);
    let (writer, guard) = non_blocking(file_appender);

    // ANSI-коды в файле не нужны.
    let layer = formatter::build_formatter_from_config(config, config.format, writer, false);

    (layer, guard)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    #[test]
    fn test_file_layer_writes_to_log_dir() {
        let dir = TempDir::new().unwrap();
        let cfg = LoggingConfig {
            file_enabled: true,
            log_dir: dir.path().to_path_buf(),
            file_name: "test.log".to_string(),
            ..LoggingConfig::default()
        };

        let (layer, guard) = layer_with_config::<Registry>(&cfg);

        tracing::subscriber::with_default(Registry::default().with(layer), || {
            tracing::info!("written to file");
        });
        drop(guard);

        let contents: String = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("test.log"))
            .map(|entry| fs::read_to_string(entry.path()).unwrap())
            .collect();

        assert!(contents.contains("written to file"));
    }
}
