use std::sync::Arc;

use log::info;

use super::classifier::StatisticalClassifier;
use super::error::ClassifierError;
use crate::config::ClassifierConfig;
use crate::statistics::{ModelSnapshot, TokenStatistics};
use crate::store::Store;
use crate::tokenizer::{Tokenizer, WordTokenizer};

/// A builder for creating or loading a StatisticalClassifier with a fluent interface.
///
/// A store is required; the tokenizer defaults to [`WordTokenizer`] and the
/// configuration to [`ClassifierConfig::default`].
#[derive(Default)]
pub struct ClassifierBuilder {
    store: Option<Arc<dyn Store>>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    config: ClassifierConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store models are created in and loaded from
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the tokenizer used for both training and classification
    ///
    /// # Example
    /// ```
    /// use tokenstat::{ClassifierBuilder, WordTokenizer};
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_tokenizer(WordTokenizer::new().with_min_length(2));
    /// ```
    pub fn with_tokenizer<T: Tokenizer + 'static>(mut self, tokenizer: T) -> Self {
        self.tokenizer = Some(Arc::new(tokenizer));
        self
    }

    /// Shares one tokenizer between several classifiers
    pub fn with_shared_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the additive smoothing constant
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.config.smoothing = smoothing;
        self
    }

    /// Enables or disables class priors learned from document counts
    pub fn with_priors(mut self, use_priors: bool) -> Self {
        self.config.use_priors = use_priors;
        self
    }

    /// Flushes automatically after every `interval` training calls
    pub fn with_flush_interval(mut self, interval: usize) -> Self {
        self.config.flush_interval = Some(interval);
        self
    }

    fn parts(self) -> Result<(Arc<dyn Store>, Arc<dyn Tokenizer>, ClassifierConfig), ClassifierError> {
        self.config.validate()?;
        let store = self
            .store
            .ok_or_else(|| ClassifierError::BuildError("A store must be set".into()))?;
        let tokenizer = self
            .tokenizer
            .unwrap_or_else(|| Arc::new(WordTokenizer::new()));
        Ok((store, tokenizer, self.config))
    }

    /// Creates a new, empty model in the store.
    ///
    /// # Errors
    /// - `ValidationError` if the name is empty or the configuration is invalid
    /// - `InvalidClassCount` if `n_classes < 2`
    /// - `ModelAlreadyExists` if the name is taken
    /// - `BuildError` if no store was set
    pub fn create(self, name: &str, n_classes: usize) -> Result<StatisticalClassifier, ClassifierError> {
        if name.is_empty() {
            return Err(ClassifierError::ValidationError("Model name cannot be empty".into()));
        }
        if n_classes < 2 {
            return Err(ClassifierError::InvalidClassCount(n_classes));
        }
        let (store, tokenizer, config) = self.parts()?;

        let record = store.create(name, n_classes)?;
        info!("Created model '{}' with {} classes", name, n_classes);

        let snapshot = ModelSnapshot {
            record,
            classes: vec![TokenStatistics::new(); n_classes],
        };
        Ok(StatisticalClassifier::from_snapshot(snapshot, store, tokenizer, config))
    }

    /// Loads an existing model and all of its class statistics.
    ///
    /// # Errors
    /// - `ModelNotFound` if no model has this name
    /// - `BuildError` if no store was set
    pub fn load(self, name: &str) -> Result<StatisticalClassifier, ClassifierError> {
        let (store, tokenizer, config) = self.parts()?;
        let snapshot = store.load(name)?;
        info!(
            "Loaded model '{}' ({} classes, last update: {:?})",
            name, snapshot.record.n_classes, snapshot.record.last_update
        );
        Ok(StatisticalClassifier::from_snapshot(snapshot, store, tokenizer, config))
    }

    /// Loads `name` if it exists, otherwise creates it.
    ///
    /// # Errors
    /// - `ValidationError` if the existing model has a different class count
    pub fn open_or_create(self, name: &str, n_classes: usize) -> Result<StatisticalClassifier, ClassifierError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ClassifierError::BuildError("A store must be set".into()))?;
        if !store.exists(name)? {
            return self.create(name, n_classes);
        }

        let classifier = self.load(name)?;
        if classifier.n_classes() != n_classes {
            return Err(ClassifierError::ValidationError(format!(
                "Model '{}' has {} classes, expected {}",
                name,
                classifier.n_classes(),
                n_classes
            )));
        }
        Ok(classifier)
    }
}
