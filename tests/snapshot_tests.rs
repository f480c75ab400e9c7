use std::fs;

use skipkv::{ErrorExt, IndexOptions, LoadReport, OrderedIndex, SnapshotError, StatusCode};
use tempfile::TempDir;

#[test]
fn test_dump_then_load_restores_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dumpFile.txt");

    let index = OrderedIndex::new(10);
    for (k, v) in [(1, "a"), (3, "b"), (7, "c")] {
        index.insert(k, v.to_string());
    }
    index.delete(&3);

    let report = index.dump(&path).unwrap();

    assert_eq!(report.entries, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "1:a\n7:c\n");
    assert_eq!(report.bytes, 8);

    let restored: OrderedIndex<i32, String> = OrderedIndex::new(10);
    let loaded = restored.load(&path).unwrap();

    assert_eq!(loaded.inserted, 2);
    assert!(!loaded.source_missing);
    assert_eq!(restored.search(&1), Some("a".to_string()));
    assert_eq!(restored.search(&7), Some("c".to_string()));
    assert_eq!(restored.search(&3), None);
}

#[test]
fn test_load_missing_file_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let index: OrderedIndex<i32, String> = OrderedIndex::new(10);

    let report = index.load(dir.path().join("absent.txt")).unwrap();

    assert_eq!(report, LoadReport::missing());
    assert!(index.is_empty());
}

#[test]
fn test_load_skips_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");
    fs::write(
        &path,
        "1:one\n\nno-delimiter\n:empty-key\n2:\nx:bad-key\n3:three:with:colons\n",
    )
    .unwrap();

    let index: OrderedIndex<i32, String> = OrderedIndex::new(10);
    let report = index.load(&path).unwrap();

    assert_eq!(report.lines, 7);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.skipped, 4);
    assert_eq!(index.search(&2), Some(String::new()));
    assert_eq!(index.search(&3), Some("three:with:colons".to_string()));
}

#[test]
fn test_load_skips_non_utf8_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");
    fs::write(&path, b"1:a\n2:\xff\xfe\n3:c\n").unwrap();

    let index: OrderedIndex<i32, String> = OrderedIndex::new(10);
    let report = index.load(&path).unwrap();

    assert_eq!(report.lines, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(index.size(), 2);
    assert_eq!(index.search(&1), Some("a".to_string()));
    assert_eq!(index.search(&2), None);
    assert_eq!(index.search(&3), Some("c".to_string()));
}

#[test]
fn test_load_directory_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let index: OrderedIndex<i32, String> = OrderedIndex::new(10);

    let report = index.load(dir.path()).unwrap();

    assert_eq!(report, LoadReport::missing());
    assert!(index.is_empty());
}

#[test]
fn test_empty_value_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");

    let index = OrderedIndex::new(10);
    index.insert(1, String::new());
    index.insert(2, "b".to_string());
    index.dump(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "1:\n2:b\n");

    let restored: OrderedIndex<i32, String> = OrderedIndex::new(10);
    let report = restored.load(&path).unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(restored.search(&1), Some(String::new()));
}

#[test]
fn test_load_keeps_existing_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");
    fs::write(&path, "1:from-file\n2:new\n").unwrap();

    let index = OrderedIndex::new(10);
    index.insert(1, "in-memory".to_string());

    let report = index.load(&path).unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(index.search(&1), Some("in-memory".to_string()));
    assert_eq!(index.size(), 2);
}

#[test]
fn test_dump_overwrites_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");
    fs::write(&path, "99:stale\n98:stale\n").unwrap();

    let index = OrderedIndex::new(10);
    index.insert(5, "fresh");
    index.dump(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "5:fresh\n");
}

#[test]
fn test_dump_to_unopenable_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("dump.txt");

    let index = OrderedIndex::new(10);
    index.insert(1, "a");

    let err = index.dump(&path).unwrap_err();

    assert!(matches!(err, SnapshotError::Unavailable { .. }));
    assert_eq!(err.status_code(), StatusCode::StorageUnavailable);
    assert_eq!(index.search(&1), Some("a"));
    assert!(!path.exists());
}

#[test]
fn test_empty_index_dumps_empty_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.txt");

    let index: OrderedIndex<i32, String> = OrderedIndex::new(10);
    let report = index.dump(&path).unwrap();

    assert_eq!(report.entries, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_custom_delimiter_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dump.tsv");
    let options = IndexOptions {
        delimiter: "\t".to_string(),
        ..IndexOptions::default()
    };

    let index = OrderedIndex::with_options(options.clone()).unwrap();
    index.insert(10u64, "ten:10".to_string());
    index.insert(20u64, "twenty".to_string());
    index.dump(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "10\tten:10\n20\ttwenty\n"
    );

    let restored: OrderedIndex<u64, String> = OrderedIndex::with_options(options).unwrap();
    restored.load(&path).unwrap();

    assert_eq!(restored.search(&10), Some("ten:10".to_string()));
    assert_eq!(restored.size(), 2);
}
