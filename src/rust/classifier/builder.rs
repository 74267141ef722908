use log::{error, info};
use ort::session::Session;
use std::path::Path;
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::inference::SequenceClassification;
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::{BuiltinModel, ModelCharacteristics, ModelManager};

const PROBE_TEXT: &str = "Test input to check the model output width";

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    model_path: Option<String>,
    tokenizer_path: Option<String>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    model_characteristics: Option<ModelCharacteristics>,
    runtime_config: RuntimeConfig,
}

impl SequenceClassification for ClassifierBuilder {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        self.tokenizer.as_ref()
    }

    fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        self.model_characteristics.as_ref().map(|c| c.max_sequence_length)
    }
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Must be called before a model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Loads a built-in model from the default model cache.
    ///
    /// The model must already be downloaded; see [`ModelManager::ensure_model_downloaded`].
    pub fn with_model(self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        let manager = ModelManager::new_default()
            .map_err(|e| {
                ClassifierError::BuildError(format!("Failed to create model manager: {}", e))
            })?;
        self.with_model_from(&manager, model)
    }

    /// Loads a built-in model from the directory managed by `manager`.
    ///
    /// # Errors
    /// - `BuildError` if a model is already set or the model is not downloaded
    /// - `BuildError`/`ModelError` if the tokenizer or session fail to load
    pub fn with_model_from(
        self,
        manager: &ModelManager,
        model: BuiltinModel,
    ) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths already set".to_string(),
            ));
        }

        let info = model.get_model_info();
        if !manager.is_model_downloaded(&info.name) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Download it first with \
                 ModelManager::ensure_model_downloaded()",
                model
            )));
        }

        let model_path = manager.get_model_path(&info.name);
        let tokenizer_path = manager.get_tokenizer_path(&info.name);
        self.load(&model_path, &tokenizer_path, model.characteristics())
    }

    /// Loads a built-in model's labels and limits from local files, for
    /// example an ONNX export produced with `optimum-cli export onnx`.
    pub fn with_model_files(
        self,
        model: BuiltinModel,
        model_path: &Path,
        tokenizer_path: &Path,
    ) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths already set".to_string(),
            ));
        }
        self.load(model_path, tokenizer_path, model.characteristics())
    }

    /// Loads a custom ONNX sequence-classification model.
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `tokenizer_path` - Path to the `tokenizer.json` file
    /// * `labels` - Labels in the order of the model's output logits
    /// * `max_sequence_length` - Token limit; defaults to 512
    pub fn with_custom_model(
        self,
        model_path: &str,
        tokenizer_path: &str,
        labels: Vec<String>,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || tokenizer_path.is_empty() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths cannot be empty".to_string(),
            ));
        }
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths already set".to_string(),
            ));
        }
        Self::validate_labels(&labels)?;

        let characteristics = ModelCharacteristics {
            labels,
            max_sequence_length: max_sequence_length.unwrap_or(512),
            model_size_mb: 0, // Not critical for functionality
        };
        self.load(Path::new(model_path), Path::new(tokenizer_path), characteristics)
    }

    fn load(
        mut self,
        model_path: &Path,
        tokenizer_path: &Path,
        characteristics: ModelCharacteristics,
    ) -> Result<Self, ClassifierError> {
        if !model_path.exists() {
            return Err(ClassifierError::BuildError(
                format!("Model file not found: {}", model_path.display()),
            ));
        }
        if !tokenizer_path.exists() {
            return Err(ClassifierError::BuildError(
                format!("Tokenizer file not found: {}", tokenizer_path.display()),
            ));
        }

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| {
                error!("Failed to load tokenizer: {}", e);
                ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
            })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: characteristics.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| {
                ClassifierError::BuildError(format!("Failed to configure truncation: {}", e))
            })?;
        info!("Tokenizer loaded from {}", tokenizer_path.display());

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;
        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        self.model_characteristics = Some(characteristics);
        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.tokenizer_path = Some(tokenizer_path.to_string_lossy().to_string());
        Ok(self)
    }

    /// Labels must be non-empty and unique.
    fn validate_labels(labels: &[String]) -> Result<(), ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::ValidationError("At least one label is required".into()));
        }
        if let Some(pos) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(ClassifierError::ValidationError(
                format!("Label {} cannot be empty", pos + 1),
            ));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(ClassifierError::ValidationError(
                    format!("Duplicate label '{}'", label),
                ));
            }
        }
        Ok(())
    }

    /// Builds the classifier after checking that the model emits one score per label.
    ///
    /// # Errors
    /// - `BuildError` if no model has been loaded
    /// - `BuildError` if the model output width does not match the label set
    pub fn build(mut self) -> Result<Classifier, ClassifierError> {
        let (Some(model_path), Some(tokenizer_path)) =
            (self.model_path.take(), self.tokenizer_path.take())
        else {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths must be set".to_string(),
            ));
        };
        let num_labels = self.model_characteristics
            .as_ref()
            .map(ModelCharacteristics::num_labels)
            .ok_or_else(|| {
                ClassifierError::BuildError("Model characteristics not set".to_string())
            })?;

        let probe = self.predict_probabilities(PROBE_TEXT)?;
        if probe.len() != num_labels {
            return Err(ClassifierError::BuildError(format!(
                "Model outputs {} scores but {} labels were configured",
                probe.len(),
                num_labels
            )));
        }
        info!("Model output width matches {} labels", num_labels);

        let tokenizer = Arc::new(self.tokenizer.take()
            .ok_or_else(|| ClassifierError::BuildError("No tokenizer loaded".into()))?);
        let session = Arc::new(self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?);
        let model_characteristics = self.model_characteristics.take()
            .ok_or_else(|| {
                ClassifierError::BuildError("Model characteristics not set".to_string())
            })?;

        Ok(Classifier {
            model_path,
            tokenizer_path,
            tokenizer,
            session,
            model_characteristics,
        })
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        let inputs = &session.inputs;
        if inputs.len() < 2 {
            return Err(ClassifierError::ModelError(format!(
                "Model must have at least 2 inputs (input_ids and attention_mask), found {}",
                inputs.len()
            )));
        }

        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for logits".to_string()
            ));
        }

        Ok(())
    }
}
