pub mod config;
pub mod index;
pub mod snapshot;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы упростить
// доступ к ним из внешнего кода.
pub use config::*;
pub use index::*;
pub use snapshot::*;
