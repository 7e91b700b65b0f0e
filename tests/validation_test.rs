use std::sync::Arc;

use tokenstat::{ClassifierError, MemoryStore, StatisticalClassifier, Store};

fn new_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

#[test]
fn test_duplicate_model() -> Result<(), ClassifierError> {
    let store = new_store();
    StatisticalClassifier::create(store.clone(), "spam", 2)?;
    assert!(StatisticalClassifier::exists(store.as_ref(), "spam")?);

    let result = StatisticalClassifier::create(store, "spam", 2);
    assert!(matches!(result, Err(ClassifierError::ModelAlreadyExists(_))));
    Ok(())
}

#[test]
fn test_missing_model() {
    let result = StatisticalClassifier::load(new_store(), "nonexistent");
    assert!(matches!(result, Err(ClassifierError::ModelNotFound(_))));
}

#[test]
fn test_single_class_model() {
    let result = StatisticalClassifier::create(new_store(), "lonely", 1);
    assert!(matches!(result, Err(ClassifierError::InvalidClassCount(1))));
}

#[test]
fn test_class_index_out_of_range() -> Result<(), ClassifierError> {
    let mut classifier = StatisticalClassifier::create(new_store(), "spam", 2)?;
    classifier.train("valid text", 1)?;

    let err = classifier.train("valid text", 7).unwrap_err();
    assert!(matches!(err, ClassifierError::InvalidClassIndex { index: 7, n_classes: 2 }));
    assert_eq!(err.to_string(), "Invalid class index 7 (model has 2 classes)");

    // The rejected call left the earlier training intact and nothing else
    assert_eq!(classifier.statistics(1).unwrap().documents(), 1);
    assert_eq!(classifier.statistics(1).unwrap().total_tokens(), 2);
    assert_eq!(classifier.statistics(0).unwrap().documents(), 0);
    Ok(())
}

#[test]
fn test_flush_without_changes() -> Result<(), ClassifierError> {
    let store = new_store();
    let mut classifier = StatisticalClassifier::create(store.clone(), "idle", 2)?;
    classifier.flush()?;
    assert!(store.load("idle")?.record.last_update.is_none());
    Ok(())
}
