#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use watchpost::application::services::ThresholdEngine;
use watchpost::domain::entities::check_result::{FailureKind, Measurement};
use watchpost::domain::ports::store::StateStore;
use watchpost::domain::value_objects::severity::Severity;
use watchpost::domain::value_objects::state_key::StateKey;
use watchpost::domain::value_objects::thresholds::Thresholds;
use watchpost::infrastructure::persistence::file_store::FileStateStore;
use watchpost::infrastructure::sources::{EpochFileSource, KeyedCounterSource, MarkerFile};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A writable copy of the vmstat fixture with `pswpout` set to `value`.
fn write_vmstat(dir: &Path, value: u64) -> PathBuf {
    let template = std::fs::read_to_string(fixture("vmstat")).expect("Failed to read fixture");
    let content: String = template
        .lines()
        .map(|line| {
            if line.starts_with("pswpout ") {
                format!("pswpout {value}\n")
            } else {
                format!("{line}\n")
            }
        })
        .collect();
    let path = dir.join("vmstat");
    std::fs::write(&path, content).expect("write vmstat");
    path
}

fn file_store(dir: &Path) -> FileStateStore {
    FileStateStore::new(&dir.to_string_lossy(), Some(Duration::from_millis(200)))
}

fn swap_key() -> StateKey {
    StateKey::new("swap").expect("key")
}

#[test]
fn swap_activity_warns_then_settles() {
    let work = tempfile::tempdir().expect("tempdir");
    let state = work.path().join("state");
    let store = file_store(&state);
    let engine = ThresholdEngine::new(&store);
    let thresholds = Thresholds::warning_only(0);

    let vmstat = write_vmstat(work.path(), 4000);
    let source = KeyedCounterSource::new(&vmstat.to_string_lossy(), "pswpout");

    let first = engine.run_delta("swap", &swap_key(), &source, &thresholds);
    assert_eq!(first.severity, Severity::Ok, "cold start never alarms");
    assert_eq!(
        std::fs::read_to_string(state.join("swap")).expect("state"),
        "4000\n"
    );

    write_vmstat(work.path(), 4100);
    let second = engine.run_delta("swap", &swap_key(), &source, &thresholds);
    assert_eq!(second.severity, Severity::Warning);
    assert_eq!(second.measurement, Some(Measurement::Delta(100)));

    let third = engine.run_delta("swap", &swap_key(), &source, &thresholds);
    assert_eq!(third.severity, Severity::Ok, "baseline advanced on the alarming run");
}

#[test]
fn reboot_resets_counter_without_alarm() {
    let work = tempfile::tempdir().expect("tempdir");
    let store = file_store(work.path());
    store.store(&swap_key(), 9000).expect("seed");
    let engine = ThresholdEngine::new(&store);

    let result = engine.evaluate_delta("swap", &swap_key(), 10, &Thresholds::new(Some(0), Some(0)));

    assert_eq!(result.severity, Severity::Ok);
    assert_eq!(result.measurement, Some(Measurement::Delta(0)));
    assert_eq!(store.load(&swap_key()).expect("load"), Some(10));
}

#[test]
fn corrupt_state_file_reports_unknown_once() {
    let work = tempfile::tempdir().expect("tempdir");
    std::fs::write(work.path().join("swap"), "garbage\n").expect("write");
    let store = file_store(work.path());
    let engine = ThresholdEngine::new(&store);
    let thresholds = Thresholds::warning_only(0);

    let first = engine.evaluate_delta("swap", &swap_key(), 500, &thresholds);
    assert_eq!(first.severity, Severity::Unknown);
    assert_eq!(first.failure, Some(FailureKind::CorruptState));
    assert_eq!(
        std::fs::read_to_string(work.path().join("swap")).expect("state"),
        "500\n",
        "corrupt baseline replaced by the current observation"
    );

    let second = engine.evaluate_delta("swap", &swap_key(), 500, &thresholds);
    assert_eq!(second.severity, Severity::Ok);
}

#[test]
fn unwritable_state_location_is_unknown() {
    let work = tempfile::tempdir().expect("tempdir");
    let blocker = work.path().join("state");
    std::fs::write(&blocker, "").expect("write");
    let store = FileStateStore::new(&blocker.to_string_lossy(), None);
    let engine = ThresholdEngine::new(&store);

    let result = engine.evaluate_delta("swap", &swap_key(), 42, &Thresholds::warning_only(0));

    assert_eq!(result.severity, Severity::Unknown);
    assert_eq!(result.failure, Some(FailureKind::StateWriteFailed));
}

#[test]
fn lookalike_keys_keep_separate_baselines() {
    let work = tempfile::tempdir().expect("tempdir");
    let store = file_store(work.path());
    let engine = ThresholdEngine::new(&store);
    let thresholds = Thresholds::warning_only(0);
    let slashed = StateKey::new("disk/root").expect("key");
    let underscored = StateKey::new("disk_root").expect("key");

    let first = engine.evaluate_delta("slashed", &slashed, 100, &thresholds);
    let second = engine.evaluate_delta("underscored", &underscored, 5000, &thresholds);

    assert_eq!(first.severity, Severity::Ok);
    assert_eq!(second.severity, Severity::Ok, "a new key starts cold");
    assert_eq!(store.load(&slashed).expect("load"), Some(100));
    assert_eq!(store.load(&underscored).expect("load"), Some(5000));
}

#[test]
fn missing_counter_source_is_unknown_and_keeps_state() {
    let work = tempfile::tempdir().expect("tempdir");
    let store = file_store(work.path());
    store.store(&swap_key(), 7).expect("seed");
    let engine = ThresholdEngine::new(&store);
    let source = KeyedCounterSource::new(&work.path().join("absent").to_string_lossy(), "pswpout");

    let result = engine.run_delta("swap", &swap_key(), &source, &Thresholds::default());

    assert_eq!(result.severity, Severity::Unknown);
    assert_eq!(result.failure, Some(FailureKind::SourceUnavailable));
    assert_eq!(store.load(&swap_key()).expect("load"), Some(7));
}

#[test]
fn puppet_lastrun_from_fixture() {
    let source = EpochFileSource::new(&fixture("puppet_lastupdate").to_string_lossy());
    let last_run = 1_700_000_000;
    let thresholds = Thresholds::warning_only(8000);

    let stale_now = Utc.timestamp_opt(last_run + 10_000, 0).single().expect("now");
    let stale = ThresholdEngine::evaluate_age("puppet", &source, None, stale_now, &thresholds);
    assert_eq!(stale.severity, Severity::Warning);

    let fresh_now = Utc.timestamp_opt(last_run + 5_000, 0).single().expect("now");
    let fresh = ThresholdEngine::evaluate_age("puppet", &source, None, fresh_now, &thresholds);
    assert_eq!(fresh.severity, Severity::Ok);

    let skewed_now = Utc.timestamp_opt(last_run - 60, 0).single().expect("now");
    let skewed = ThresholdEngine::evaluate_age("puppet", &source, None, skewed_now, &thresholds);
    assert_eq!(skewed.severity, Severity::Ok);
    assert!(skewed.is_clock_skewed());
}

#[test]
fn puppet_disabled_marker_skips_check() {
    let work = tempfile::tempdir().expect("tempdir");
    let marker_path = work.path().join(".nopuppetd");
    std::fs::write(&marker_path, "").expect("write");
    let marker = MarkerFile::new(&marker_path.to_string_lossy());
    let source = EpochFileSource::new(&work.path().join("missing").to_string_lossy());

    let result = ThresholdEngine::evaluate_age(
        "puppet",
        &source,
        Some(&marker),
        Utc::now(),
        &Thresholds::warning_only(8000),
    );

    assert_eq!(result.severity, Severity::Ok, "marker wins even over a missing statefile");
}

#[test]
fn concurrent_invocations_leave_a_valid_baseline() {
    let work = tempfile::tempdir().expect("tempdir");
    let state = work.path().to_path_buf();

    let handles: Vec<_> = (0..8_u64)
        .map(|i| {
            let state = state.clone();
            std::thread::spawn(move || {
                let store = file_store(&state);
                let engine = ThresholdEngine::new(&store);
                for round in 0..20 {
                    let result = engine.evaluate_delta(
                        "swap",
                        &swap_key(),
                        1000 + i * 100 + round,
                        &Thresholds::default(),
                    );
                    assert_ne!(result.failure, Some(FailureKind::CorruptState));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let store = file_store(&state);
    let value = store.load(&swap_key()).expect("valid baseline");
    assert!(value.is_some_and(|v| (1000..=1719).contains(&v)));
}
