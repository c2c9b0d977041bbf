use std::fs;

use pail_log::{default_logger, LogOptions, Logger};
use tracing::level_filters::LevelFilter;

fn file_options(dir: &std::path::Path) -> LogOptions {
    LogOptions {
        to_console: false,
        log_dir: dir.join("logs"),
        ..LogOptions::default()
    }
}

fn read_lines(options: &LogOptions) -> Vec<String> {
    fs::read_to_string(options.log_path())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn creates_log_dir_and_writes_formatted_line() {
    let tmp = tempfile::tempdir().unwrap();
    let options = file_options(tmp.path());

    let logger = Logger::configure(&options).unwrap();
    logger.in_scope(|| tracing::info!(bucket = "test-bucket", "client ready"));

    let lines = read_lines(&options);
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.contains(" | INFO     | pail | client ready"), "{line}");
    assert!(line.contains("bucket=\"test-bucket\""), "{line}");

    // "YYYY-MM-DD HH:MM:SS" prefix
    let stamp = &line[..19];
    assert_eq!(stamp.as_bytes()[4], b'-');
    assert_eq!(stamp.as_bytes()[10], b' ');
    assert_eq!(stamp.as_bytes()[13], b':');
}

#[test]
fn level_filters_lower_events() {
    let tmp = tempfile::tempdir().unwrap();
    let options = LogOptions {
        level: LevelFilter::WARN,
        ..file_options(tmp.path())
    };

    let logger = Logger::configure(&options).unwrap();
    logger.in_scope(|| {
        tracing::debug!("hidden debug");
        tracing::info!("hidden info");
        tracing::warn!("shown warn");
    });

    let lines = read_lines(&options);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("| WARN     |"));
    assert!(lines[0].contains("shown warn"));
}

#[test]
fn directives_refine_level() {
    let tmp = tempfile::tempdir().unwrap();
    let options = LogOptions {
        level: LevelFilter::INFO,
        directives: Some("noisy=error".to_string()),
        ..file_options(tmp.path())
    };

    let logger = Logger::configure(&options).unwrap();
    logger.in_scope(|| {
        tracing::info!(target: "noisy", "suppressed");
        tracing::info!("kept");
    });

    let lines = read_lines(&options);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("kept"));
}

#[test]
fn reconfigure_does_not_duplicate_lines() {
    let tmp = tempfile::tempdir().unwrap();
    let options = file_options(tmp.path());

    let logger = Logger::configure(&options).unwrap();
    logger.reconfigure(&options).unwrap();
    logger.reconfigure(&options).unwrap();
    logger.in_scope(|| tracing::info!("only once"));

    let lines = read_lines(&options);
    assert_eq!(lines.iter().filter(|l| l.contains("only once")).count(), 1);
}

#[test]
fn reconfigure_is_seen_by_clones() {
    let tmp = tempfile::tempdir().unwrap();
    let first = file_options(tmp.path());
    let second = LogOptions {
        name: "other".to_string(),
        file_name: "other.log".to_string(),
        ..file_options(tmp.path())
    };

    let logger = Logger::configure(&first).unwrap();
    let held = logger.clone();
    logger.reconfigure(&second).unwrap();
    held.in_scope(|| tracing::info!("after swap"));

    assert_eq!(held.name(), "other");
    assert!(read_lines(&first).is_empty());
    let lines = read_lines(&second);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("| other | after swap"));
}

#[test]
fn console_only_creates_no_file() {
    let tmp = tempfile::tempdir().unwrap();
    let options = LogOptions {
        to_file: false,
        ..file_options(tmp.path())
    };

    let logger = Logger::configure(&options).unwrap();
    logger.in_scope(|| tracing::info!("to stderr"));

    assert!(!options.log_dir.exists());
}

#[test]
fn default_logger_is_a_singleton() {
    let a = default_logger();
    let b = default_logger();
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.name(), "pail");
}
