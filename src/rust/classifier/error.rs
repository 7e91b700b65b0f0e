use thiserror::Error;

use crate::store::StoreError;

/// Represents the different types of errors that can occur in the text classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// No model with this name exists in the store
    #[error("Statistical model '{0}' not found")]
    ModelNotFound(String),
    /// A model with this name already exists in the store
    #[error("Statistical model '{0}' already exists")]
    ModelAlreadyExists(String),
    /// A class index outside `0..n_classes` was supplied
    #[error("Invalid class index {index} (model has {n_classes} classes)")]
    InvalidClassIndex { index: usize, n_classes: usize },
    /// A model was requested with fewer than two classes
    #[error("Invalid class count {0}: a model needs at least 2 classes")]
    InvalidClassCount(usize),
    /// The builder was missing something it needs
    #[error("Build error: {0}")]
    BuildError(String),
    /// Error occurred while tokenizing text
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// The store failed for a reason other than a missing or duplicate model
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ClassifierError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => ClassifierError::ModelNotFound(name),
            StoreError::AlreadyExists(name) => ClassifierError::ModelAlreadyExists(name),
            other => ClassifierError::Store(other),
        }
    }
}
