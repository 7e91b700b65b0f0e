use crate::classifier::ClassifierError;

/// Tuning knobs for training and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Additive smoothing constant (alpha) applied to every token count
    pub smoothing: f64,
    /// Weight classes by how many training texts they received; uniform otherwise
    pub use_priors: bool,
    /// Flush to the store automatically after this many training calls
    pub flush_interval: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            use_priors: true,
            flush_interval: None, // Flush only when asked
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 {
            return Err(ClassifierError::ValidationError(format!(
                "Smoothing must be a positive finite number, got {}",
                self.smoothing
            )));
        }
        if self.flush_interval == Some(0) {
            return Err(ClassifierError::ValidationError(
                "Flush interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
