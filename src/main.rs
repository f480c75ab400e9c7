use std::fs;

use anyhow::Context;
use skipkv::{init_logging, OrderedIndex, Settings};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    let logging = init_logging(settings.logging_config()).context("failed to init logging")?;

    let result = run(&settings);
    if let Err(e) = &result {
        tracing::error!(error = %e, "skipkv demo failed");
    }

    logging.shutdown();

    result
}

fn run(settings: &Settings) -> anyhow::Result<()> {
    let index: OrderedIndex<i32, String> = OrderedIndex::with_options(settings.index_options())?;

    if let Some(dir) = settings.store_path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }

    index.load(&settings.store_path)?;
    print!("{}", index.render());

    let entries = [
        (1, "a"),
        (3, "b"),
        (7, "c"),
        (8, "d"),
        (9, "e"),
        (11, "f"),
        (12, "g"),
        (15, "h"),
        (16, "i"),
        (17, "j"),
        (18, "k"),
        (19, "l"),
    ];

    for (key, value) in entries {
        index.insert(key, value.to_string());
    }

    index.dump(&settings.store_path)?;

    println!("skipList size: {}", index.size());

    for key in [9, 18, 29] {
        match index.search(&key) {
            Some(value) => println!("Found key: {key}, value: {value}"),
            None => println!("Not Found Key: {key}"),
        }
    }

    print!("{}", index.render());

    index.delete(&7);
    index.delete(&19);

    println!("skipList size: {}", index.size());
    print!("{}", index.render());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            store_path: dir.path().join("store").join("dumpFile.txt"),
            ..Settings::default()
        };

        run(&settings).unwrap();

        let dumped = fs::read_to_string(&settings.store_path).unwrap();
        assert_eq!(dumped.lines().count(), 12);
        assert!(dumped.starts_with("1:a\n3:b\n"));
    }

    /// Ошибка выгрузки возвращается из `run`, а не обрывает `main` до
    /// shutdown логирования.
    #[test]
    fn test_run_reports_dump_failure() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            store_path: dir.path().to_path_buf(),
            ..Settings::default()
        };

        let err = run(&settings).unwrap_err();

        assert!(err.to_string().contains("Snapshot unavailable"), "got: {err}");
    }
}
