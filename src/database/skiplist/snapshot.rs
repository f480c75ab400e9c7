//! Текстовый снапшот индекса.
//!
//! Формат построчный, без заголовка, длин и контрольных сумм:
//!
//! ```text
//! <key><delimiter><value>\n
//! ```
//!
//! Ключ - текст до первого вхождения разделителя, значение - весь остаток
//! строки. Экранирования нет: разделитель внутри ключа не переживёт
//! выгрузку, внутри значения - переживёт.

use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    str::FromStr,
};

use skipkv_error::{IndexError, SnapshotError};

use super::InsertStatus;

/// Разделитель по умолчанию.
pub const DEFAULT_DELIMITER: &str = ":";

/// Параметры текстового формата.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFormat {
    delimiter: String,
}

/// Итог загрузки снапшота.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Источник не удалось открыть; ничего не загружено
    pub source_missing: bool,
    /// Прочитано строк
    pub lines: usize,
    /// Вставлено новых ключей
    pub inserted: usize,
    /// Ключ уже был в индексе
    pub duplicates: usize,
    /// Пропущено некорректных строк
    pub skipped: usize,
}

/// Итог выгрузки снапшота.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpReport {
    /// Записано пар ключ–значение
    pub entries: usize,
    /// Записано байт
    pub bytes: u64,
}

impl SnapshotFormat {
    pub fn new(delimiter: impl Into<String>) -> Result<Self, IndexError> {
        let delimiter = delimiter.into();

        if delimiter.is_empty() {
            return Err(IndexError::EmptyDelimiter);
        }

        Ok(Self { delimiter })
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Разбирает одну строку снапшота. `line_no` начинается с 1 и нужен
    /// только для диагностики.
    pub fn decode_line<K, V>(
        &self,
        line_no: usize,
        line: &str,
    ) -> Result<(K, V), SnapshotError>
    where
        K: FromStr,
        V: FromStr,
    {
        if line.is_empty() {
            return Err(SnapshotError::malformed(line_no, "empty line"));
        }

        let (key, value) = line
            .split_once(self.delimiter.as_str())
            .ok_or_else(|| SnapshotError::malformed(line_no, "missing delimiter"))?;

        if key.is_empty() {
            return Err(SnapshotError::malformed(line_no, "empty key"));
        }

        let key = key
            .parse::<K>()
            .map_err(|_| SnapshotError::malformed(line_no, format!("unparsable key '{key}'")))?;
        let value = value
            .parse::<V>()
            .map_err(|_| SnapshotError::malformed(line_no, "unparsable value"))?;

        Ok((key, value))
    }

    /// Записывает одну строку и возвращает число записанных байт.
    pub fn encode_line<K, V, W>(
        &self,
        writer: &mut W,
        key: &K,
        value: &V,
    ) -> io::Result<u64>
    where
        K: Display,
        V: Display,
        W: Write,
    {
        let line = format!("{key}{}{value}\n", self.delimiter);
        writer.write_all(line.as_bytes())?;
        Ok(line.len() as u64)
    }
}

impl Default for SnapshotFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl LoadReport {
    pub fn missing() -> Self {
        Self {
            source_missing: true,
            ..Self::default()
        }
    }
}

/// Читает снапшот построчно и передаёт каждую корректную пару в `insert`.
/// Некорректные строки, в том числе не-UTF-8, пропускаются и только
/// подсчитываются. Ошибкой считается только сбой самого чтения.
pub fn read_snapshot<K, V, R, F>(
    format: &SnapshotFormat,
    mut reader: R,
    mut insert: F,
) -> io::Result<LoadReport>
where
    K: FromStr,
    V: FromStr,
    R: BufRead,
    F: FnMut(K, V) -> InsertStatus,
{
    let mut report = LoadReport::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        report.lines += 1;

        let raw = trim_line_ending(&buf);
        let Ok(line) = std::str::from_utf8(raw) else {
            report.skipped += 1;
            continue;
        };

        match format.decode_line::<K, V>(report.lines, line) {
            Ok((key, value)) => match insert(key, value) {
                InsertStatus::Inserted => report.inserted += 1,
                InsertStatus::AlreadyExists => report.duplicates += 1,
            },
            Err(_) => report.skipped += 1,
        }
    }

    Ok(report)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Записывает пары в порядке итератора, по одной на строку.
pub fn write_snapshot<'a, K, V, W, I>(
    format: &SnapshotFormat,
    writer: &mut W,
    entries: I,
) -> io::Result<DumpReport>
where
    K: Display + 'a,
    V: Display + 'a,
    W: Write,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut report = DumpReport::default();

    for (key, value) in entries {
        report.bytes += format.encode_line(writer, key, value)?;
        report.entries += 1;
    }

    writer.flush()?;

    Ok(report)
}
