//! SkipList - упорядоченный индекс для skipkv.
//!
//! # Модули
//!
//! - `skiplist_base`: базовая однопоточная реализация на арене узлов.
//! - `concurrent`: потокобезопасная обёртка `OrderedIndex` с `Arc<RwLock>`.
//! - `height`: генерация высоты башни.
//! - `snapshot`: текстовый формат `key:value` для загрузки и выгрузки.
//! - `safety`: валидация и статистика.

pub mod concurrent;
pub mod height;
pub mod safety;
pub mod skiplist_base;
pub mod snapshot;

// Publicly re-export all types and functions from the submodules to
// simplify access from external code.
pub use concurrent::*;
pub use height::*;
pub use safety::*;
pub use skiplist_base::*;
pub use snapshot::*;
