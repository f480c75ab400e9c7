use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления lifecycle логирования. Пока он жив, неблокирующий
/// файловый writer продолжает сбрасывать буфер на диск; guard дописывает
/// оставшиеся записи, когда его отпускают.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    /// Graceful shutdown: отпускает guard, который дописывает буфер
    /// файлового writer'а.
    pub fn shutdown(mut self) {
        tracing::info!(
            file_sink = self.file_guard.is_some(),
            "Initiating logging shutdown"
        );

        drop(self.file_guard.take());
    }
}

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        if self.file_guard.is_some() {
            eprintln!(
                "WARNING: LoggingHandle dropped without explicit shutdown(). \
                 Some logs may be lost. Call .shutdown() for graceful cleanup."
            )
        }
    }
}
