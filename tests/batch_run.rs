mod common;

use audio_batch_analyzer::{run_batch, RunConfig};
use common::{stub_analyzer, write_track};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config(root: &Path, threads: usize) -> RunConfig {
    RunConfig::new(root.join("music"), root.join("report.csv"))
        .with_error_log(root.join("bad.txt"))
        .with_threads(threads)
        .with_progress(false)
}

fn setup() -> TempDir {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("music")).unwrap();
    root
}

#[test]
fn test_mixed_batch_splits_rows_and_failures() {
    let root = setup();
    let music = root.path().join("music");

    let good = 7;
    let bad = 3;
    for i in 0..good {
        write_track(&music, &format!("good{:02}.wav", i), 1000);
    }
    for i in 0..bad {
        write_track(&music, &format!("bad{:02}.wav", i), -1000);
    }

    let summary = run_batch(&config(root.path(), 4), stub_analyzer()).unwrap();

    assert_eq!(summary.submitted, good + bad);
    assert_eq!(summary.completed, good + bad);
    assert_eq!(summary.succeeded, good as u64);
    assert_eq!(summary.failed, bad as u64);
    assert!(summary.fault.is_none());

    let csv = fs::read_to_string(root.path().join("report.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "File Name,Duration,Frequency,Key,Tempo");
    assert_eq!(lines.len(), 1 + good);

    // completion order, so compare as a set
    let mut rows: Vec<&str> = lines[1..].to_vec();
    rows.sort_unstable();
    let expected: Vec<String> = (0..good)
        .map(|i| format!("good{:02},2,8000,Am,128.00", i))
        .collect();
    assert_eq!(rows, expected);

    let log = fs::read_to_string(root.path().join("bad.txt")).unwrap();
    let mut failures: Vec<&str> = log.lines().collect();
    failures.sort_unstable();
    assert_eq!(
        failures,
        vec![
            "bad00: not enough beats found",
            "bad01: not enough beats found",
            "bad02: not enough beats found",
        ]
    );
}

#[test]
fn test_single_worker_processes_everything() {
    let root = setup();
    let music = root.path().join("music");
    for i in 0..5 {
        write_track(&music, &format!("t{}.wav", i), 500);
    }

    let summary = run_batch(&config(root.path(), 1), stub_analyzer()).unwrap();
    assert_eq!(summary.completed, 5);
    assert_eq!(summary.succeeded, 5);
    assert!(!root.path().join("bad.txt").exists());
}

#[test]
fn test_empty_and_junk_files_are_logged() {
    let root = setup();
    let music = root.path().join("music");
    fs::write(music.join("empty.mp3"), b"").unwrap();
    fs::write(music.join("junk.flac"), vec![0x42u8; 1024]).unwrap();
    write_track(&music, "fine.wav", 2000);

    let summary = run_batch(&config(root.path(), 2), stub_analyzer()).unwrap();
    assert_eq!(summary.submitted, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);

    let log = fs::read_to_string(root.path().join("bad.txt")).unwrap();
    assert!(log.contains("empty: not enough beats found"), "{}", log);
    assert!(log.contains("junk: decoder setup failed"), "{}", log);
}

#[test]
fn test_failure_log_is_appended_across_runs() {
    let root = setup();
    write_track(&root.path().join("music"), "quiet.wav", -5);
    fs::write(root.path().join("bad.txt"), "earlier: old failure\n").unwrap();

    run_batch(&config(root.path(), 2), stub_analyzer()).unwrap();
    run_batch(&config(root.path(), 2), stub_analyzer()).unwrap();

    let log = fs::read_to_string(root.path().join("bad.txt")).unwrap();
    assert_eq!(
        log,
        "earlier: old failure\nquiet: not enough beats found\nquiet: not enough beats found\n"
    );

    // the report itself is truncated every run
    let csv = fs::read_to_string(root.path().join("report.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[test]
fn test_subfolders_need_recursive_flag() {
    let root = setup();
    let music = root.path().join("music");
    fs::create_dir(music.join("nested")).unwrap();
    write_track(&music, "top.wav", 100);
    write_track(&music.join("nested"), "deep.wav", 100);

    let flat = run_batch(&config(root.path(), 2), stub_analyzer()).unwrap();
    assert_eq!(flat.submitted, 1);

    let deep = run_batch(&config(root.path(), 2).with_recursive(true), stub_analyzer()).unwrap();
    assert_eq!(deep.submitted, 2);
    assert_eq!(deep.succeeded, 2);
}

#[test]
fn test_missing_input_folder_is_setup_error() {
    let root = TempDir::new().unwrap();
    let result = run_batch(&config(root.path(), 2), stub_analyzer());
    assert!(result.is_err());
}
