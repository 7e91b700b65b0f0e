use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use ndarray::Array1;

use super::builder::ClassifierBuilder;
use super::error::ClassifierError;
use super::utils::{argmax, softmax};
use super::ClassifierInfo;
use crate::config::ClassifierConfig;
use crate::statistics::{ModelSnapshot, TokenStatistics};
use crate::store::Store;
use crate::tokenizer::Tokenizer;

/// A named Naive Bayes text classifier backed by a [`Store`].
///
/// The classifier holds a cached copy of the model's per-class token
/// statistics. Training mutates the cache; [`flush`](Self::flush) commits it
/// back to the store in a single `save`. Classification only reads the
/// cache and never touches the store.
///
/// `train` and `flush` take `&mut self`, so one instance always has a
/// single writer. `classify` takes `&self` and can be called from several
/// threads through an `Arc` once training is done.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use tokenstat::{MemoryStore, StatisticalClassifier};
///
/// let store = Arc::new(MemoryStore::new());
/// let mut classifier = StatisticalClassifier::create(store.clone(), "spam", 2)?;
///
/// classifier.train("buy now free money", 1)?;
/// classifier.train("meeting notes project update", 0)?;
/// classifier.flush()?;
///
/// assert_eq!(classifier.classify("free money")?, 1);
/// # Ok(())
/// # }
/// ```
pub struct StatisticalClassifier {
    name: String,
    n_classes: usize,
    classes: Vec<TokenStatistics>,
    vocabulary: HashSet<String>,
    last_update: Option<DateTime<Utc>>,
    pending_updates: usize,
    store: Arc<dyn Store>,
    tokenizer: Arc<dyn Tokenizer>,
    config: ClassifierConfig,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<StatisticalClassifier>();
    }
};

impl StatisticalClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::new()
    }

    /// Creates a new model in `store` using the default tokenizer and configuration.
    ///
    /// # Errors
    /// - `ModelAlreadyExists` if the name is taken
    /// - `InvalidClassCount` if `n_classes < 2`
    pub fn create(store: Arc<dyn Store>, name: &str, n_classes: usize) -> Result<Self, ClassifierError> {
        Self::builder().with_store(store).create(name, n_classes)
    }

    /// Loads an existing model from `store` using the default tokenizer and configuration.
    ///
    /// # Errors
    /// - `ModelNotFound` if no model has this name
    pub fn load(store: Arc<dyn Store>, name: &str) -> Result<Self, ClassifierError> {
        Self::builder().with_store(store).load(name)
    }

    /// Returns whether `store` holds a model named `name`
    pub fn exists(store: &dyn Store, name: &str) -> Result<bool, ClassifierError> {
        Ok(store.exists(name)?)
    }

    pub(crate) fn from_snapshot(
        snapshot: ModelSnapshot,
        store: Arc<dyn Store>,
        tokenizer: Arc<dyn Tokenizer>,
        config: ClassifierConfig,
    ) -> Self {
        let vocabulary = snapshot
            .classes
            .iter()
            .flat_map(|stats| stats.tokens().map(str::to_string))
            .collect();

        Self {
            name: snapshot.record.name,
            n_classes: snapshot.record.n_classes,
            classes: snapshot.classes,
            vocabulary,
            last_update: snapshot.record.last_update,
            pending_updates: 0,
            store,
            tokenizer,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Time of the most recent training call, persisted or not
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Statistics of one class, `None` if the index is out of range
    pub fn statistics(&self, class: usize) -> Option<&TokenStatistics> {
        self.classes.get(class)
    }

    /// Number of distinct tokens seen across all classes
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether there are training updates not yet committed to the store
    pub fn is_dirty(&self) -> bool {
        self.pending_updates > 0
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            name: self.name.clone(),
            num_classes: self.n_classes,
            vocabulary_size: self.vocabulary.len(),
            class_documents: self.classes.iter().map(TokenStatistics::documents).collect(),
            class_tokens: self.classes.iter().map(TokenStatistics::total_tokens).collect(),
            last_update: self.last_update,
            pending_updates: self.pending_updates,
        }
    }

    fn check_class(&self, class: usize) -> Result<(), ClassifierError> {
        if class >= self.n_classes {
            return Err(ClassifierError::InvalidClassIndex {
                index: class,
                n_classes: self.n_classes,
            });
        }
        Ok(())
    }

    fn training_tokens(&self, text: &str) -> Result<Vec<String>, ClassifierError> {
        let tokens = self.tokenizer.tokenize(text)?;
        if tokens.is_empty() {
            return Err(ClassifierError::ValidationError(
                "Training text produced no tokens".into(),
            ));
        }
        Ok(tokens)
    }

    fn apply(&mut self, tokens: &[String], class: usize) {
        self.classes[class].record(tokens.iter().map(String::as_str));
        for token in tokens {
            if !self.vocabulary.contains(token) {
                self.vocabulary.insert(token.clone());
            }
        }
    }

    /// Bumps the update time and flushes when the configured interval is reached.
    ///
    /// The update is already applied at this point, so a failed automatic
    /// flush only leaves it pending for the next `flush`.
    fn finish_training(&mut self, updates: usize) {
        self.last_update = Some(Utc::now());
        self.pending_updates += updates;
        match self.config.flush_interval {
            Some(interval) if self.pending_updates >= interval => {
                if let Err(e) = self.flush() {
                    warn!(
                        "Automatic flush of model '{}' failed, {} updates still pending: {}",
                        self.name, self.pending_updates, e
                    );
                }
            }
            _ => {}
        }
    }

    /// Counts every token of `text` once more in class `class`.
    ///
    /// The text is fully tokenized and the class validated before anything
    /// is mutated, so a failed call leaves the statistics untouched. The
    /// update stays in memory until the next [`flush`](Self::flush), unless
    /// a flush interval is configured and has been reached. A failed
    /// automatic flush is logged and does not fail the call: the update
    /// stays applied and pending, and the next `flush` reports the error.
    ///
    /// # Errors
    /// - `InvalidClassIndex` if `class >= n_classes`
    /// - `ValidationError` if the text yields no tokens
    /// - `TokenizerError` if the text cannot be tokenized
    pub fn train(&mut self, text: &str, class: usize) -> Result<(), ClassifierError> {
        self.check_class(class)?;
        let tokens = self.training_tokens(text)?;
        debug!("Training model '{}' class {} on {} tokens", self.name, class, tokens.len());
        self.apply(&tokens, class);
        self.finish_training(1);
        Ok(())
    }

    /// Trains on several labeled texts. Every item is validated and
    /// tokenized first; if any fails, nothing is applied.
    pub fn train_batch<'a, I>(&mut self, examples: I) -> Result<(), ClassifierError>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let mut prepared = Vec::new();
        for (text, class) in examples {
            self.check_class(class)?;
            prepared.push((self.training_tokens(text)?, class));
        }
        if prepared.is_empty() {
            return Ok(());
        }

        debug!("Training model '{}' on a batch of {} texts", self.name, prepared.len());
        for (tokens, class) in &prepared {
            self.apply(tokens, *class);
        }
        self.finish_training(prepared.len());
        Ok(())
    }

    /// Log-score of `text` under every class:
    /// `log P(c) + sum over tokens of log P(token | c)`.
    pub fn scores(&self, text: &str) -> Result<Array1<f64>, ClassifierError> {
        let tokens = self.tokenizer.tokenize(text)?;
        let alpha = self.config.smoothing;
        // One extra slot so tokens never seen in training keep some mass
        let vocabulary_size = self.vocabulary.len() + 1;
        let total_documents: u64 = self.classes.iter().map(TokenStatistics::documents).sum();

        let scores = self
            .classes
            .iter()
            .map(|stats| {
                let prior = if self.config.use_priors {
                    ((stats.documents() as f64 + alpha)
                        / (total_documents as f64 + alpha * self.n_classes as f64))
                        .ln()
                } else {
                    -(self.n_classes as f64).ln()
                };
                let likelihood: f64 = tokens
                    .iter()
                    .map(|token| stats.log_probability(token, alpha, vocabulary_size))
                    .sum();
                prior + likelihood
            })
            .collect();

        Ok(scores)
    }

    /// Returns the index of the most probable class for `text`.
    ///
    /// Ties go to the lowest class index. Text made only of unseen tokens
    /// (or no tokens at all) is decided by the class priors.
    pub fn classify(&self, text: &str) -> Result<usize, ClassifierError> {
        let scores = self.scores(text)?;
        Ok(argmax(&scores))
    }

    /// Predicts the class of the input text and returns posterior probabilities.
    ///
    /// # Returns
    /// A tuple containing:
    /// * The predicted class index
    /// * The posterior probability of every class, summing to 1.0
    pub fn predict(&self, text: &str) -> Result<(usize, Vec<f64>), ClassifierError> {
        let scores = self.scores(text)?;
        let best = argmax(&scores);
        debug!("Model '{}' classified text as class {}", self.name, best);
        Ok((best, softmax(&scores).to_vec()))
    }

    /// Commits all class statistics and the last update time in one store write.
    ///
    /// Does nothing when there are no pending training updates.
    pub fn flush(&mut self) -> Result<(), ClassifierError> {
        if self.pending_updates == 0 {
            debug!("Model '{}' has no pending updates, skipping flush", self.name);
            return Ok(());
        }
        self.store.save(&self.name, &self.classes, self.last_update)?;
        info!(
            "Flushed model '{}' ({} pending training updates)",
            self.name, self.pending_updates
        );
        self.pending_updates = 0;
        Ok(())
    }
}

impl fmt::Display for StatisticalClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatisticalClassifier(name={}, n_classes={}, last_update=", self.name, self.n_classes)?;
        match self.last_update {
            Some(time) => write!(f, "{})", time.to_rfc3339()),
            None => write!(f, "never)"),
        }
    }
}

impl fmt::Debug for StatisticalClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatisticalClassifier")
            .field("name", &self.name)
            .field("n_classes", &self.n_classes)
            .field("vocabulary_size", &self.vocabulary.len())
            .field("last_update", &self.last_update)
            .field("pending_updates", &self.pending_updates)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for StatisticalClassifier {
    fn drop(&mut self) {
        if self.pending_updates > 0 {
            warn!(
                "Model '{}' dropped with {} unflushed training updates",
                self.name, self.pending_updates
            );
        }
    }
}
