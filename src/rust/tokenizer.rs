use std::path::Path;

use crate::classifier::ClassifierError;

/// Turns raw text into the normalized tokens the classifier counts.
///
/// Training and classification of one model must use the same tokenizer,
/// otherwise token keys are not comparable across calls. Implementations
/// are expected to be pure: the same text always yields the same tokens.
pub trait Tokenizer: Send + Sync {
    /// Splits `text` into normalized tokens.
    ///
    /// # Errors
    /// - `TokenizerError` if the text cannot be encoded
    fn tokenize(&self, text: &str) -> Result<Vec<String>, ClassifierError>;

    /// Counts the tokens in `text` without keeping them
    fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        self.tokenize(text).map(|tokens| tokens.len())
    }
}

/// Lowercases text and splits it on every non-alphanumeric character.
///
/// ```
/// use tokenstat::{Tokenizer, WordTokenizer};
///
/// let tokens = WordTokenizer::new().tokenize("Buy NOW, free money!").unwrap();
/// assert_eq!(tokens, vec!["buy", "now", "free", "money"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    min_length: usize,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops tokens shorter than `min_length` characters
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, ClassifierError> {
        Ok(text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty() && word.chars().count() >= self.min_length)
            .map(str::to_lowercase)
            .collect())
    }
}

/// Tokenizes with a pretrained HuggingFace tokenizer loaded from `tokenizer.json`.
///
/// Special tokens are not added; the tokenizer's own normalizer decides
/// casing and accent handling. The model does not record which file was
/// used, so load the same one for every session of a model.
pub struct PretrainedTokenizer {
    inner: tokenizers::Tokenizer,
}

impl PretrainedTokenizer {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifierError::TokenizerError(format!("Tokenizer file not found: {:?}", path)));
        }
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            log::error!("Failed to load tokenizer: {}", e);
            ClassifierError::TokenizerError(format!("Failed to load tokenizer: {}", e))
        })?;
        log::info!("Tokenizer loaded from {:?}", path);
        Ok(Self { inner })
    }
}

impl From<tokenizers::Tokenizer> for PretrainedTokenizer {
    fn from(inner: tokenizers::Tokenizer) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for PretrainedTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PretrainedTokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer for PretrainedTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, ClassifierError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;
        Ok(encoding.get_tokens().to_vec())
    }
}
