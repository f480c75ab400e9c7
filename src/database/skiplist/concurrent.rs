use std::{
    fmt::{Debug, Display},
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use skipkv_error::{ErrorExt, IndexError, LogLevel, SnapshotError};
use tracing::{debug, error, info, warn};

use super::{
    read_snapshot, write_snapshot, DeleteStatus, DumpReport, HeightSource, InsertStatus,
    LoadReport, SkipList, SkipListStatistics, SnapshotFormat, ValidationError, DEFAULT_MAX_HEIGHT,
};

/// Потокобезопасный упорядоченный индекс.
///
/// Одна блокировка чтения/записи охраняет всю структуру: поиск, размер и
/// перечисление идут под разделяемой блокировкой, вставка и удаление - под
/// эксклюзивной. Выгрузка снапшота тоже берёт эксклюзивную блокировку на всё
/// время записи, поэтому читатели ждут её окончания.
///
/// Клон индекса - ещё один дескриптор той же структуры.
#[derive(Debug)]
pub struct OrderedIndex<K, V> {
    inner: Arc<RwLock<SkipList<K, V>>>,
    format: Arc<SnapshotFormat>,
    metrics: Arc<ContentionMetrics>,
}

/// Параметры создания индекса.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Максимальная высота башни
    pub max_height: usize,
    /// Разделитель ключа и значения в снапшоте
    pub delimiter: String,
    /// Seed собственного генератора высоты; `None` - генератор потока
    pub seed: Option<u64>,
}

/// Содержимое одного уровня на момент чтения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSnapshot<K, V> {
    pub level: usize,
    pub entries: Vec<(K, V)>,
}

#[derive(Debug, Default)]
pub struct ContentionMetrics {
    pub read_locks: AtomicUsize,
    pub write_locks: AtomicUsize,
    pub total_wait_time_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentionSnapshot {
    pub read_locks: usize,
    pub write_locks: usize,
    pub total_wait_time_ns: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT,
            delimiter: super::DEFAULT_DELIMITER.to_string(),
            seed: None,
        }
    }
}

impl IndexOptions {
    pub fn with_max_height(max_height: usize) -> Self {
        Self {
            max_height,
            ..Self::default()
        }
    }
}

impl<K, V> OrderedIndex<K, V>
where
    K: Ord + Debug,
{
    /// Создаёт пустой индекс.
    ///
    /// # Panics
    ///
    /// Паникует, если `max_height == 0`.
    pub fn new(max_height: usize) -> Self {
        Self::from_list(SkipList::new(max_height), SnapshotFormat::default())
    }

    /// Создаёт индекс по параметрам, проверяя их.
    pub fn with_options(options: IndexOptions) -> Result<Self, IndexError> {
        if options.max_height == 0 {
            return Err(IndexError::InvalidMaxHeight {
                value: options.max_height,
            });
        }

        let format = SnapshotFormat::new(options.delimiter)?;
        let heights = match options.seed {
            Some(seed) => HeightSource::seeded(seed),
            None => HeightSource::ThreadLocal,
        };

        Ok(Self::from_list(
            SkipList::with_source(options.max_height, heights),
            format,
        ))
    }

    fn from_list(
        list: SkipList<K, V>,
        format: SnapshotFormat,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(list)),
            format: Arc::new(format),
            metrics: Arc::new(ContentionMetrics::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SkipList<K, V>> {
        let start = Instant::now();
        let guard = self.inner.read();
        self.metrics.inc_read(start.elapsed().as_nanos() as u64);
        guard
    }

    fn write(&self) -> RwLockWriteGuard<'_, SkipList<K, V>> {
        let start = Instant::now();
        let guard = self.inner.write();
        self.metrics.inc_write(start.elapsed().as_nanos() as u64);
        guard
    }

    /// Количество элементов.
    pub fn size(&self) -> usize {
        self.read().len()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn max_height(&self) -> usize {
        self.read().max_height()
    }

    pub fn current_height(&self) -> usize {
        self.read().current_height()
    }

    /// Ищет ключ и возвращает копию значения.
    pub fn search(
        &self,
        key: &K,
    ) -> Option<V>
    where
        V: Clone,
    {
        let found = self.read().search(key).cloned();

        match found {
            Some(_) => debug!(?key, "Key found"),
            None => debug!(?key, "Key not found"),
        }

        found
    }

    pub fn contains(
        &self,
        key: &K,
    ) -> bool {
        self.read().contains(key)
    }

    /// Вставляет пару. Существующий ключ не перезаписывается.
    pub fn insert(
        &self,
        key: K,
        value: V,
    ) -> InsertStatus {
        debug!(?key, "Inserting key");

        let status = self.write().insert(key, value);

        if status == InsertStatus::AlreadyExists {
            debug!("Key exists, insert skipped");
        }

        status
    }

    /// Удаляет ключ.
    pub fn delete(
        &self,
        key: &K,
    ) -> DeleteStatus {
        let status = DeleteStatus::from(self.write().remove(key));

        match status {
            DeleteStatus::Deleted => debug!(?key, "Key deleted"),
            DeleteStatus::NotFound => debug!(?key, "Delete of absent key"),
        }

        status
    }

    /// Удаляет ключ и возвращает его значение.
    pub fn remove(
        &self,
        key: &K,
    ) -> Option<V> {
        self.write().remove(key)
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn first(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.read().first().map(|(k, v)| (k.clone(), v.clone()))
    }

    pub fn last(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.read().last().map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Пары с `start <= key < end` по возрастанию.
    pub fn range(
        &self,
        start: &K,
        end: &K,
    ) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.read()
            .range(start, end)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Содержимое всех занятых уровней сверху вниз, снятое под одной
    /// разделяемой блокировкой.
    pub fn enumerate(&self) -> Vec<LevelSnapshot<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        self.read()
            .levels()
            .map(|(level, entries)| LevelSnapshot {
                level,
                entries: entries.map(|(k, v)| (k.clone(), v.clone())).collect(),
            })
            .collect()
    }

    /// Отображение уровней в виде `Level i: k:v -> k:v`.
    pub fn render(&self) -> String
    where
        K: Display,
        V: Display,
    {
        self.read().to_string()
    }

    pub fn statistics(&self) -> SkipListStatistics {
        self.read().statistics()
    }

    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        self.read().validate_invariants()
    }

    /// Выполняет `f` под одной разделяемой блокировкой.
    pub fn with_read<F, R>(
        &self,
        f: F,
    ) -> R
    where
        F: FnOnce(&SkipList<K, V>) -> R,
    {
        f(&self.read())
    }

    /// Выполняет `f` под одной эксклюзивной блокировкой.
    pub fn with_write<F, R>(
        &self,
        f: F,
    ) -> R
    where
        F: FnOnce(&mut SkipList<K, V>) -> R,
    {
        f(&mut self.write())
    }

    /// Загружает снапшот из файла. Отсутствующий файл - это «нечего
    /// загружать», а не ошибка. Каждая строка вставляется под своей
    /// эксклюзивной блокировкой, загрузка целиком не атомарна.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<LoadReport, SnapshotError>
    where
        K: FromStr,
        V: FromStr,
    {
        let path = path.as_ref();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                if e.kind() == io::ErrorKind::NotFound {
                    debug!(path = %path.display(), "No snapshot to load");
                } else {
                    warn!(path = %path.display(), error = %e, "Snapshot is not readable, nothing loaded");
                }
                return Ok(LoadReport::missing());
            }
        };

        // На Linux каталог открывается успешно, а падает уже первое чтение.
        if file.metadata().is_ok_and(|meta| meta.is_dir()) {
            warn!(path = %path.display(), "Snapshot path is a directory, nothing loaded");
            return Ok(LoadReport::missing());
        }

        let report = read_snapshot(&self.format, BufReader::new(file), |k, v| self.insert(k, v))
            .map_err(|e| logged(SnapshotError::io(path.display().to_string(), &e)))?;

        info!(
            path = %path.display(),
            inserted = report.inserted,
            duplicates = report.duplicates,
            "Snapshot loaded"
        );

        if report.skipped > 0 {
            warn!(
                path = %path.display(),
                skipped = report.skipped,
                "Malformed snapshot lines skipped"
            );
        }

        Ok(report)
    }

    /// Загружает снапшот из произвольного источника.
    pub fn load_from_reader<R>(
        &self,
        reader: R,
    ) -> Result<LoadReport, SnapshotError>
    where
        K: FromStr,
        V: FromStr,
        R: BufRead,
    {
        read_snapshot(&self.format, reader, |k, v| self.insert(k, v))
            .map_err(|e| logged(SnapshotError::io("<reader>", &e)))
    }

    /// Перезаписывает файл снапшотом нулевого уровня. Эксклюзивная
    /// блокировка держится от открытия файла до `flush`.
    pub fn dump(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<DumpReport, SnapshotError>
    where
        K: Display,
        V: Display,
    {
        let path = path.as_ref();
        let guard = self.write();

        let file = match File::create(path) {
            Ok(file) => file,
            Err(e) => {
                return Err(logged(SnapshotError::unavailable(
                    path.display().to_string(),
                    &e,
                )));
            }
        };

        let mut writer = BufWriter::new(file);
        let report = write_snapshot(&self.format, &mut writer, guard.iter())
            .map_err(|e| logged(SnapshotError::io(path.display().to_string(), &e)))?;

        drop(guard);

        info!(
            path = %path.display(),
            entries = report.entries,
            bytes = report.bytes,
            "Snapshot dumped"
        );

        Ok(report)
    }

    /// Выгружает снапшот в произвольный приёмник.
    pub fn dump_to_writer<W>(
        &self,
        mut writer: W,
    ) -> Result<DumpReport, SnapshotError>
    where
        K: Display,
        V: Display,
        W: Write,
    {
        let guard = self.write();
        let report = write_snapshot(&self.format, &mut writer, guard.iter())
            .map_err(|e| logged(SnapshotError::io("<writer>", &e)))?;

        Ok(report)
    }

    pub fn metrics(&self) -> ContentionSnapshot {
        ContentionSnapshot {
            read_locks: self.metrics.read_locks.load(Ordering::Relaxed),
            write_locks: self.metrics.write_locks.load(Ordering::Relaxed),
            total_wait_time_ns: self.metrics.total_wait_time_ns.load(Ordering::Relaxed),
        }
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

impl ContentionSnapshot {
    pub fn total_locks(&self) -> usize {
        self.read_locks + self.write_locks
    }

    pub fn average_wait_time_ns(&self) -> f64 {
        let total_locks = self.total_locks();

        if total_locks == 0 {
            0.0
        } else {
            self.total_wait_time_ns as f64 / total_locks as f64
        }
    }

    pub fn read_write_ratio(&self) -> f64 {
        if self.write_locks == 0 {
            f64::INFINITY
        } else {
            self.read_locks as f64 / self.write_locks as f64
        }
    }

    pub fn average_wait_duration(&self) -> Duration {
        Duration::from_nanos(self.average_wait_time_ns() as u64)
    }

    pub fn format_report(&self) -> String {
        format!(
            "Contention Metrics:\n\
                 Read locks: {}\n\
                 Write locks: {}\n\
                 R/W ratio: {:.2}\n\
                 Avg wait time: {:.2} µs\n",
            self.read_locks,
            self.write_locks,
            self.read_write_ratio(),
            self.average_wait_time_ns() / 1000.0,
        )
    }
}

impl ContentionMetrics {
    pub fn reset(&self) {
        self.read_locks.store(0, Ordering::Relaxed);
        self.write_locks.store(0, Ordering::Relaxed);
        self.total_wait_time_ns.store(0, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_read(
        &self,
        duration_ns: u64,
    ) {
        self.read_locks.fetch_add(1, Ordering::Relaxed);
        self.total_wait_time_ns
            .fetch_add(duration_ns, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_write(
        &self,
        duration_ns: u64,
    ) {
        self.write_locks.fetch_add(1, Ordering::Relaxed);
        self.total_wait_time_ns
            .fetch_add(duration_ns, Ordering::Relaxed);
    }
}

/// Логирует ошибку снапшота на уровне, выведенном из её статуса, и
/// возвращает её дальше.
fn logged(err: SnapshotError) -> SnapshotError {
    let tags = err.metrics_tags();
    let critical = err.status_code().is_critical();

    match err.log_level() {
        LogLevel::Debug => debug!(?tags, critical, error = %err, "Snapshot operation failed"),
        LogLevel::Info => info!(?tags, critical, error = %err, "Snapshot operation failed"),
        LogLevel::Warn => warn!(?tags, critical, error = %err, "Snapshot operation failed"),
        LogLevel::Error => error!(?tags, critical, error = %err, "Snapshot operation failed"),
    }

    err
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для OrderedIndex
////////////////////////////////////////////////////////////////////////////////

impl<K, V> Clone for OrderedIndex<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            format: Arc::clone(&self.format),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<K, V> Default for OrderedIndex<K, V>
where
    K: Ord + Debug,
{
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEIGHT)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
