use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{new_snapshot, updated_snapshot, Store, StoreError};
use crate::statistics::{ModelRecord, ModelSnapshot, TokenStatistics};

/// An in-process store. Models live as long as the store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    models: RwLock<HashMap<String, ModelSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all models currently held, sorted
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        let models = self.models.read().map_err(|_| StoreError::Poisoned)?;
        let mut names: Vec<String> = models.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl Store for MemoryStore {
    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let models = self.models.read().map_err(|_| StoreError::Poisoned)?;
        Ok(models.contains_key(name))
    }

    fn load(&self, name: &str) -> Result<ModelSnapshot, StoreError> {
        let models = self.models.read().map_err(|_| StoreError::Poisoned)?;
        models
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn create(&self, name: &str, n_classes: usize) -> Result<ModelRecord, StoreError> {
        let mut models = self.models.write().map_err(|_| StoreError::Poisoned)?;
        if models.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        let snapshot = new_snapshot(name, n_classes)?;
        let record = snapshot.record.clone();
        models.insert(name.to_string(), snapshot);
        log::debug!("Created in-memory model '{}' with {} classes", name, n_classes);
        Ok(record)
    }

    fn save(
        &self,
        name: &str,
        classes: &[TokenStatistics],
        last_update: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let mut models = self.models.write().map_err(|_| StoreError::Poisoned)?;
        let current = models
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        *current = updated_snapshot(current, classes, last_update)?;
        Ok(())
    }
}
