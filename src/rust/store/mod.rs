//! Durable storage for named models and their per-class token statistics.
//!
//! The classifier only talks to storage through the [`Store`] trait, so any
//! backend that can provide these four operations can hold models:
//!
//! - [`MemoryStore`] keeps everything in process memory
//! - [`FileStore`] writes one checksummed JSON document per model

use std::io;

use chrono::{DateTime, Utc};

use crate::statistics::{ModelRecord, ModelSnapshot, TokenStatistics};

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Model not found: {0}")]
    NotFound(String),
    #[error("Model already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid model name: {0:?}")]
    InvalidName(String),
    #[error("Invalid snapshot for model '{name}': {reason}")]
    InvalidSnapshot { name: String, reason: String },
    #[error("Checksum mismatch for model '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Keyed storage for model metadata and per-class token statistics.
///
/// Implementations must be safe to share between threads. `save` is
/// all-or-nothing: either every class table and the new `last_update` are
/// committed, or the stored model is left as it was.
pub trait Store: Send + Sync {
    /// Returns whether a model with this name has been created
    fn exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Loads a model's metadata and all of its class tables.
    ///
    /// # Errors
    /// - `NotFound` if no model has this name
    fn load(&self, name: &str) -> Result<ModelSnapshot, StoreError>;

    /// Materializes a new model with `n_classes` empty class tables.
    ///
    /// # Errors
    /// - `AlreadyExists` if the name is taken
    /// - `InvalidSnapshot` if `n_classes < 2`
    fn create(&self, name: &str, n_classes: usize) -> Result<ModelRecord, StoreError>;

    /// Replaces a model's class tables and last update time in one commit.
    ///
    /// # Errors
    /// - `NotFound` if the model was never created
    /// - `InvalidSnapshot` if the number of tables differs from the model's class count
    fn save(
        &self,
        name: &str,
        classes: &[TokenStatistics],
        last_update: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}

/// Builds the snapshot that `save` should commit on top of `current`.
pub(crate) fn updated_snapshot(
    current: &ModelSnapshot,
    classes: &[TokenStatistics],
    last_update: Option<DateTime<Utc>>,
) -> Result<ModelSnapshot, StoreError> {
    let snapshot = ModelSnapshot {
        record: ModelRecord {
            last_update,
            ..current.record.clone()
        },
        classes: classes.to_vec(),
    };
    snapshot.validate().map_err(|reason| StoreError::InvalidSnapshot {
        name: current.record.name.clone(),
        reason,
    })?;
    Ok(snapshot)
}

/// Builds and validates the snapshot of a newly created model.
pub(crate) fn new_snapshot(name: &str, n_classes: usize) -> Result<ModelSnapshot, StoreError> {
    let snapshot = ModelSnapshot::empty(name, n_classes);
    snapshot.validate().map_err(|reason| StoreError::InvalidSnapshot {
        name: name.to_string(),
        reason,
    })?;
    Ok(snapshot)
}
