use ort::session::Session;
use std::sync::Arc;
use tokenizers::Tokenizer;

use super::error::ClassifierError;
use super::inference::SequenceClassification;
use super::{ClassifierInfo, EmotionClassifier, LabelScore};
use crate::ModelCharacteristics;

/// An emotion classifier backed by an ONNX sequence-classification model.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: the tokenizer and session are
/// wrapped in `Arc` and never mutated after `build()`.
///
/// ```rust,no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use moodlens::{BuiltinModel, Classifier, EmotionClassifier};
///
/// let classifier = Classifier::builder()
///     .with_model(BuiltinModel::DistilBertEmotion)?
///     .build()?;
///
/// for score in classifier.classify("I can't wait for the weekend!")? {
///     println!("{}: {:.3}", score.label, score.score);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Classifier {
    pub model_path: String,
    pub tokenizer_path: String,
    pub tokenizer: Arc<Tokenizer>,
    pub session: Arc<Session>,
    pub model_characteristics: ModelCharacteristics,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl SequenceClassification for Classifier {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&self.session)
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.model_characteristics.max_sequence_length)
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the loaded model
    pub fn info(&self) -> ClassifierInfo {
        ClassifierInfo {
            model_path: self.model_path.clone(),
            tokenizer_path: self.tokenizer_path.clone(),
            labels: self.model_characteristics.labels.clone(),
            max_sequence_length: self.model_characteristics.max_sequence_length,
        }
    }

    /// Number of tokens the model sees for `text` after truncation.
    pub fn token_count(&self, text: &str) -> Result<usize, ClassifierError> {
        self.count_tokens(text)
    }
}

impl EmotionClassifier for Classifier {
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        if text.is_empty() {
            return Err(ClassifierError::ValidationError("Input text cannot be empty".into()));
        }

        let probabilities = self.predict_probabilities(text)?;
        let labels = &self.model_characteristics.labels;
        if probabilities.len() != labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced {} scores for {} labels",
                probabilities.len(),
                labels.len()
            )));
        }

        Ok(labels
            .iter()
            .zip(probabilities)
            .map(|(label, score)| LabelScore::new(label.clone(), score))
            .collect())
    }

    fn labels(&self) -> Vec<String> {
        self.model_characteristics.labels.clone()
    }
}
