use chrono::{DateTime, Utc};

mod error;
#[allow(clippy::module_inception)]
mod classifier;
pub mod builder;
mod utils;

pub use error::ClassifierError;
pub use classifier::StatisticalClassifier;
pub use builder::ClassifierBuilder;

/// Information about the current state of a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierInfo {
    /// Name of the model
    pub name: String,
    /// Number of classes the model distinguishes
    pub num_classes: usize,
    /// Number of distinct tokens seen across all classes
    pub vocabulary_size: usize,
    /// Training texts recorded per class
    pub class_documents: Vec<u64>,
    /// Token occurrences recorded per class
    pub class_tokens: Vec<u64>,
    /// Time of the most recent training call
    pub last_update: Option<DateTime<Utc>>,
    /// Training calls not yet flushed to the store
    pub pending_updates: usize,
}
