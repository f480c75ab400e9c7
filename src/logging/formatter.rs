use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, JsonFields},
        MakeWriter,
    },
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Собирает fmt-слой по конфигурации. Возвращаем boxed trait-объект, чтобы
/// стереть конкретный тип формата (json/pretty/compact).
pub fn build_formatter_from_config<S, W>(
    config: &LoggingConfig,
    format: LogFormat,
    writer: W,
    with_ansi: bool,
) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => {
            let json_fmt = fmt::format().json().with_current_span(true);
            let layer = fmt::layer()
                .event_format(json_fmt)
                .fmt_fields(JsonFields::new())
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(config.with_target)
                .with_thread_names(config.with_thread_ids)
                .with_thread_ids(config.with_thread_ids);
            Box::new(layer)
        }
        LogFormat::Pretty => {
            let pretty_fmt = fmt::format().pretty();
            let layer = fmt::layer()
                .event_format(pretty_fmt)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(config.with_target)
                .with_thread_names(config.with_thread_ids)
                .with_thread_ids(config.with_thread_ids);
            Box::new(layer)
        }
        LogFormat::Compact => {
            let compact_fmt = fmt::format().compact();
            let layer = fmt::layer()
                .event_format(compact_fmt)
                .with_writer(writer)
                .with_ansi(with_ansi)
                .with_target(config.with_target)
                .with_thread_names(config.with_thread_ids)
                .with_thread_ids(config.with_thread_ids);
            Box::new(layer)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    #[derive(Clone)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(format: LogFormat) -> String {
        let buffer = Buffer(Arc::new(Mutex::new(Vec::new())));
        let layer = build_formatter_from_config::<Registry, _>(
            &LoggingConfig::default(),
            format,
            buffer.clone(),
            false,
        );

        tracing::subscriber::with_default(Registry::default().with(layer), || {
            tracing::info!(key = 7, "Inserting key");
        });

        let out = buffer.0.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_json_format() {
        let out = capture(LogFormat::Json);

        assert!(out.trim_start().starts_with('{'));
        assert!(out.contains("\"message\":\"Inserting key\""));
        assert!(out.contains("\"key\":7"));
    }

    #[test]
    fn test_compact_and_pretty_formats() {
        assert!(capture(LogFormat::Compact).contains("Inserting key"));
        assert!(capture(LogFormat::Pretty).contains("Inserting key"));
    }
}
