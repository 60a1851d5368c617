mod common;

use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;

use abstrak::engine::{ClassificationEngine, ModelHandle};
use abstrak::error::AbstrakError;
use abstrak::storage::{Document, MemoryRecordStore, ModelStore, RecordStore};
use abstrak::track::{Source, Track};
use tempfile::TempDir;

#[test]
fn test_concurrent_retrain_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let (texts, labels) = common::corpus();

    let handle = Arc::new(ModelHandle::new());
    let barrier = Arc::new(Barrier::new(2));

    let lock = handle.begin_training().unwrap();
    let worker = {
        let handle = Arc::clone(&handle);
        let barrier = Arc::clone(&barrier);
        let config = config.clone();
        let texts = texts.clone();
        let labels = labels.clone();
        thread::spawn(move || {
            let result = handle.retrain(&config, &texts, &labels, false);
            barrier.wait();
            result
        })
    };
    barrier.wait();
    let result = worker.join().unwrap();
    assert!(matches!(result, Err(AbstrakError::TrainingInProgress)));
    assert!(!handle.is_loaded());

    drop(lock);
    handle.retrain(&config, &texts, &labels, false).unwrap();
    assert!(handle.is_loaded());
}

#[test]
fn test_staging_directory_is_not_a_model() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let (texts, labels) = common::corpus();

    let handle = ModelHandle::new();
    handle.retrain(&config, &texts, &labels, true).unwrap();

    let staging = dir.path().join(".model.staging-leftover");
    fs::create_dir(&staging).unwrap();
    for entry in fs::read_dir(&config.model_dir).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), staging.join(entry.file_name())).unwrap();
    }

    assert!(ModelStore::new(&staging).load().is_err());
    assert!(ModelStore::new(&config.model_dir).load().is_ok());
}

#[test]
fn test_predictions_run_against_snapshot_during_retrain() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());
    let (texts, labels) = common::corpus();

    let handle = ModelHandle::new();
    handle.retrain(&config, &texts, &labels, false).unwrap();
    let snapshot = handle.current().unwrap();

    handle.retrain(&config, &texts, &labels, false).unwrap();
    let current = handle.current().unwrap();
    assert!(!Arc::ptr_eq(&snapshot, &current));

    let text = "Router Mikrotik untuk jaringan wireless";
    assert_eq!(
        snapshot.predict_single(text).unwrap(),
        current.predict_single(text).unwrap()
    );
}

#[test]
fn test_store_workflow() {
    let dir = TempDir::new().unwrap();
    let config = common::config(dir.path());

    let store = Arc::new(MemoryRecordStore::new());
    for text in common::TKJ_ABSTRACTS {
        store.insert(Document::new("tkj", *text)).unwrap();
    }
    for text in common::RPL_ABSTRACTS {
        store.insert(Document::new("rpl", *text)).unwrap();
    }
    store
        .insert(Document::new("manual", "Teks pendek").with_label(Track::Rpl))
        .unwrap();

    let engine = ClassificationEngine::new(config, store.clone(), Arc::new(ModelHandle::new()));
    let summary = engine.bootstrap_labels().unwrap();
    assert_eq!(summary.labeled, 16);
    assert_eq!(summary.skipped, 1);

    engine.retrain(true).unwrap();
    assert_eq!(store.metrics().unwrap().len(), 1);

    let reloaded = ClassificationEngine::new(
        engine.config().clone(),
        store.clone(),
        Arc::new(ModelHandle::new()),
    );
    reloaded.load_model().unwrap();
    let prediction = reloaded
        .classify_text("Manajemen bandwidth jaringan dengan Mikrotik", Source::Manual)
        .unwrap();
    assert_eq!(prediction.label, Track::Tkj);

    let results = reloaded.classify_all().unwrap();
    assert_eq!(results.len(), 17);
    let manual = store
        .list()
        .unwrap()
        .into_iter()
        .find(|d| d.title == "manual")
        .unwrap();
    assert_eq!(manual.manual_label, Some(Track::Rpl));
    assert!(manual.predicted_label.is_some());
}
