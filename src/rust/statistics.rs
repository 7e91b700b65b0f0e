//! Token statistics and model metadata shared by the classifier and the stores.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Unique model name, immutable after creation
    pub name: String,
    /// Number of mutually exclusive classes, fixed at creation
    pub n_classes: usize,
    /// When the model was first materialized in the store
    pub created_at: DateTime<Utc>,
    /// Time of the most recent persisted training event, `None` until first trained
    pub last_update: Option<DateTime<Utc>>,
}

impl ModelRecord {
    pub fn new(name: impl Into<String>, n_classes: usize) -> Self {
        Self {
            name: name.into(),
            n_classes,
            created_at: Utc::now(),
            last_update: None,
        }
    }
}

/// Occurrence counts of tokens observed in training texts of a single class.
///
/// Counts are raw integers; probabilities are derived at scoring time with
/// additive smoothing so that an unseen token never has zero probability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStatistics {
    counts: HashMap<String, u64>,
    total_tokens: u64,
    documents: u64,
}

impl TokenStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `token` was seen in this class
    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Sum of all token occurrences in this class
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Number of training texts recorded for this class
    pub fn documents(&self) -> u64 {
        self.documents
    }

    /// Number of distinct tokens seen in this class
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Records one training text: every token is counted once per occurrence.
    pub(crate) fn record<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for token in tokens {
            *self.counts.entry(token.to_string()).or_insert(0) += 1;
            self.total_tokens += 1;
        }
        self.documents += 1;
    }

    /// Smoothed log-probability of `token` under this class.
    ///
    /// `P(t|c) = (count(t,c) + alpha) / (total(c) + alpha * vocabulary_size)`
    pub fn log_probability(&self, token: &str, smoothing: f64, vocabulary_size: usize) -> f64 {
        let numerator = self.count(token) as f64 + smoothing;
        let denominator = self.total_tokens as f64 + smoothing * vocabulary_size as f64;
        (numerator / denominator).ln()
    }

    /// Checks that the stored total agrees with the individual counts.
    pub(crate) fn is_consistent(&self) -> bool {
        self.counts.values().sum::<u64>() == self.total_tokens
            && (self.total_tokens == 0 || self.documents > 0)
    }
}

/// A model's metadata together with one statistics table per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub record: ModelRecord,
    pub classes: Vec<TokenStatistics>,
}

impl ModelSnapshot {
    /// A freshly created model with `n_classes` empty tables
    pub fn empty(name: impl Into<String>, n_classes: usize) -> Self {
        Self {
            record: ModelRecord::new(name, n_classes),
            classes: vec![TokenStatistics::new(); n_classes],
        }
    }

    /// Returns a description of the first structural problem found, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.record.name.is_empty() {
            return Err("model name is empty".into());
        }
        if self.record.n_classes < 2 {
            return Err(format!("model declares {} classes, at least 2 required", self.record.n_classes));
        }
        if self.classes.len() != self.record.n_classes {
            return Err(format!(
                "model declares {} classes but carries {} statistics tables",
                self.record.n_classes,
                self.classes.len()
            ));
        }
        if let Some(pos) = self.classes.iter().position(|c| !c.is_consistent()) {
            return Err(format!("statistics table {} has inconsistent totals", pos));
        }
        Ok(())
    }
}
