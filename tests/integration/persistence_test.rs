#![allow(clippy::expect_used)]

use std::time::Duration;

use watchpost::application::config::{StateBackend, StateConfig};
use watchpost::application::services::ThresholdEngine;
use watchpost::domain::entities::check_result::FailureKind;
use watchpost::domain::ports::store::{StateStore, StoreError};
use watchpost::domain::value_objects::severity::Severity;
use watchpost::domain::value_objects::state_key::StateKey;
use watchpost::domain::value_objects::thresholds::Thresholds;
use watchpost::infrastructure::persistence::{FileStateStore, SqliteStore, open_state_store};

fn key(name: &str) -> StateKey {
    StateKey::new(name).expect("key")
}

fn sqlite_config(dir: &std::path::Path) -> StateConfig {
    StateConfig {
        backend: StateBackend::Sqlite,
        database: dir.join("state.db").to_string_lossy().into_owned(),
        ..StateConfig::default()
    }
}

#[test]
fn sqlite_backend_keeps_baselines_between_invocations() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = sqlite_config(dir.path());
    let thresholds = Thresholds::critical_only(50);

    {
        let store = open_state_store(&config).expect("open");
        let engine = ThresholdEngine::new(store.as_ref());
        let first = engine.evaluate_delta("errors", &key("errors"), 100, &thresholds);
        assert_eq!(first.severity, Severity::Ok);
    }

    let store = open_state_store(&config).expect("reopen");
    let engine = ThresholdEngine::new(store.as_ref());
    let second = engine.evaluate_delta("errors", &key("errors"), 200, &thresholds);
    assert_eq!(second.severity, Severity::Critical);
}

#[test]
fn keys_are_independent_in_both_backends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = FileStateStore::new(&dir.path().join("files").to_string_lossy(), None);
    let sqlite = SqliteStore::new(&dir.path().join("state.db").to_string_lossy(), None)
        .expect("sqlite");

    for store in [&file as &dyn StateStore, &sqlite as &dyn StateStore] {
        store.store(&key("swap"), 1).expect("store swap");
        store.store(&key("puppet/run"), 2).expect("store puppet");
        assert_eq!(store.load(&key("swap")).expect("load"), Some(1));
        assert_eq!(store.load(&key("puppet/run")).expect("load"), Some(2));
        assert_eq!(store.load(&key("other")).expect("load"), None);
    }
}

#[test]
fn hand_edited_state_file_is_detected_as_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStateStore::new(&dir.path().to_string_lossy(), None);
    std::fs::write(store.path_for(&key("swap")), "-12\n").expect("write");

    match store.load(&key("swap")) {
        Err(StoreError::Corrupt { key, content }) => {
            assert_eq!(key, "swap");
            assert_eq!(content, "-12\n");
        }
        other => panic!("expected corrupt state, got {other:?}"),
    }
}

#[test]
fn held_lock_delays_but_never_blocks_evaluation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStateStore::new(
        &dir.path().to_string_lossy(),
        Some(Duration::from_millis(100)),
    );
    let _held = store.lock(&key("swap")).expect("lock");

    let other = FileStateStore::new(
        &dir.path().to_string_lossy(),
        Some(Duration::from_millis(100)),
    );
    let engine = ThresholdEngine::new(&other);
    let result = engine.evaluate_delta("swap", &key("swap"), 5, &Thresholds::default());

    assert_eq!(result.severity, Severity::Ok);
    assert_ne!(result.failure, Some(FailureKind::StateWriteFailed));
    assert_eq!(other.load(&key("swap")).expect("load"), Some(5));
}

#[test]
fn unopenable_database_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").expect("write");
    let config = StateConfig {
        backend: StateBackend::Sqlite,
        database: blocker.join("state.db").to_string_lossy().into_owned(),
        ..StateConfig::default()
    };
    assert!(open_state_store(&config).is_err());
}
