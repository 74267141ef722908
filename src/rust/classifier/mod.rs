mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod inference;
mod utils;

pub use builder::ClassifierBuilder;
pub use classifier::Classifier;
pub use error::ClassifierError;

use serde::{Deserialize, Serialize};

/// A single label and its score for one classified chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Scores one text chunk against a fixed emotion label set.
///
/// Implementations must be cheap to share: the server holds a single
/// instance behind an `Arc` and calls it from the blocking thread pool.
pub trait EmotionClassifier: Send + Sync {
    /// Returns one score per label, covering the full label set, for `text`.
    ///
    /// `text` is at most the analyzer's chunk size; implementations may still
    /// truncate at their own token limit.
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError>;

    /// The label set this classifier scores against, in output order.
    fn labels(&self) -> Vec<String>;
}

/// Information about a built classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    pub model_path: String,
    pub tokenizer_path: String,
    pub labels: Vec<String>,
    pub max_sequence_length: usize,
}
