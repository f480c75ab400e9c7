/// Settings loading (defaults, optional file, `SKIPKV_*` environment).
pub mod config;
/// The ordered index: arena skip list, concurrent wrapper, text snapshots.
pub mod database;
/// Common error types re-exported from `skipkv-error`, plus logging errors.
pub mod error;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// config
pub use crate::config::Settings;
/// Ordered index, its single-threaded core and statuses.
pub use database::{
    DeleteStatus, DumpReport, IndexOptions, InsertStatus, LevelSnapshot, LoadReport,
    OrderedIndex, SkipList, SkipListStatistics, SnapshotFormat, ValidationError,
};
/// Operation errors and result types.
pub use error::{
    ConfigError, ErrorExt, IndexError, LogLevel, LoggingError, SnapshotError, StatusCode,
};
/// Logging bootstrap.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
