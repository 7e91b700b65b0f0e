//! A persisted Naive Bayes text classifier.
//!
//! Each model has a name, a fixed number of classes and, for every class, a
//! table of token occurrence counts. Models live in a [`Store`]; a
//! [`StatisticalClassifier`] caches one model in memory, trains it on
//! labeled text and classifies new text against it.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use tokenstat::{MemoryStore, StatisticalClassifier, Store};
//!
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! let mut classifier = StatisticalClassifier::create(store.clone(), "spam", 2)?;
//!
//! for _ in 0..3 {
//!     classifier.train("buy now free money", 1)?;
//! }
//! classifier.train("meeting notes project update", 0)?;
//! classifier.flush()?;
//!
//! let reloaded = StatisticalClassifier::load(store, "spam")?;
//! let (class, posteriors) = reloaded.predict("free money now")?;
//! assert_eq!(class, 1);
//! println!("{} -> {:?}", reloaded, posteriors);
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! Training only changes the in-memory copy. Call
//! [`StatisticalClassifier::flush`] (or configure a flush interval) to commit
//! the statistics; the store applies each flush as a single write. Keep at
//! most one writing classifier per model name, since separate instances are
//! never reconciled.

pub mod classifier;
pub mod config;
pub mod statistics;
pub mod store;
pub mod tokenizer;

pub use classifier::{ClassifierBuilder, ClassifierError, ClassifierInfo, StatisticalClassifier};
pub use config::ClassifierConfig;
pub use statistics::{ModelRecord, ModelSnapshot, TokenStatistics};
pub use store::{FileStore, MemoryStore, Store, StoreError};
pub use tokenizer::{PretrainedTokenizer, Tokenizer, WordTokenizer};

/// Initializes `env_logger` from `RUST_LOG`; call once at program start.
pub fn init_logger() {
    env_logger::init();
}
