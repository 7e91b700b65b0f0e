use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use tokenstat::{ClassifierError, FileStore, StatisticalClassifier, Store, StoreError, TokenStatistics};

#[test]
fn test_file_store_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(dir.path())?);

    let mut classifier = StatisticalClassifier::create(store.clone(), "spam", 2)?;
    for _ in 0..3 {
        classifier.train("buy now free money", 1)?;
    }
    for _ in 0..2 {
        classifier.train("meeting notes project update", 0)?;
    }
    classifier.flush()?;
    let trained_at = classifier.last_update();
    drop(classifier);

    // A fresh store over the same directory sees the committed model
    let reopened = Arc::new(FileStore::new(dir.path())?);
    let classifier = StatisticalClassifier::load(reopened, "spam")?;
    assert_eq!(classifier.n_classes(), 2);
    assert_eq!(classifier.last_update(), trained_at);
    assert_eq!(classifier.statistics(1).unwrap().count("free"), 3);
    assert_eq!(classifier.statistics(0).unwrap().count("project"), 2);
    assert_eq!(classifier.classify("free money now")?, 1);
    assert_eq!(classifier.classify("project update")?, 0);
    Ok(())
}

#[test]
fn test_create_then_exists() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(dir.path())?);

    assert!(!StatisticalClassifier::exists(&*store, "news")?);
    StatisticalClassifier::create(store.clone(), "news", 4)?;
    assert!(StatisticalClassifier::exists(&*store, "news")?);
    assert_eq!(store.list()?, vec!["news".to_string()]);

    let duplicate = StatisticalClassifier::create(store, "news", 4);
    assert!(matches!(duplicate, Err(ClassifierError::ModelAlreadyExists(name)) if name == "news"));
    Ok(())
}

#[test]
fn test_load_missing_model() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(dir.path())?);

    let result = StatisticalClassifier::load(store, "nonexistent");
    assert!(matches!(result, Err(ClassifierError::ModelNotFound(name)) if name == "nonexistent"));
    Ok(())
}

#[test]
fn test_corrupted_file_is_detected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(dir.path())?);
    store.create("fragile", 2)?;

    let path = store.get_model_path("fragile")?;
    let contents = fs::read_to_string(&path)?;
    fs::write(&path, contents.replace("\"n_classes\":2", "\"n_classes\":3"))?;

    assert!(matches!(store.load("fragile"), Err(StoreError::ChecksumMismatch { .. })));
    let result = StatisticalClassifier::load(store, "fragile");
    assert!(matches!(result, Err(ClassifierError::Store(StoreError::ChecksumMismatch { .. }))));
    Ok(())
}

#[test]
fn test_failed_save_keeps_previous_commit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = FileStore::new(dir.path())?;
    store.create("stable", 2)?;

    let result = store.save("stable", &[TokenStatistics::new()], None);
    assert!(matches!(result, Err(StoreError::InvalidSnapshot { .. })));

    let snapshot = store.load("stable")?;
    assert_eq!(snapshot.classes.len(), 2);
    assert!(snapshot.record.last_update.is_none());
    Ok(())
}

#[test]
fn test_invalid_names_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(dir.path())?);

    let result = StatisticalClassifier::create(store, "../outside", 2);
    assert!(matches!(result, Err(ClassifierError::Store(StoreError::InvalidName(_)))));
    Ok(())
}
