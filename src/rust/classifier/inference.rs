use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use std::collections::HashMap;
use tokenizers::Tokenizer;

use super::error::ClassifierError;
use super::utils::softmax;

/// Runs a sequence-classification ONNX model over a single piece of text.
///
/// The ONNX model is expected to:
/// - Accept `input_ids` and `attention_mask` (both shape [batch_size, sequence_length])
/// - Output logits of shape [batch_size, num_labels]
///
/// Implementors supply the loaded tokenizer and session; the provided methods
/// handle tokenization, tensor construction and softmax.
pub(crate) trait SequenceClassification {
    /// Returns the initialized tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Returns the maximum sequence length the model can handle
    fn max_sequence_length(&self) -> Option<usize>;

    /// Counts the tokens the model would see for `text`, special tokens included.
    ///
    /// The tokenizer truncates at the model limit, so this never exceeds
    /// `max_sequence_length`.
    fn count_tokens(&self, text: &str) -> Result<usize, ClassifierError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;

        tokenizer.encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))
            .map(|encoding| encoding.get_ids().len())
    }

    /// Converts text into token IDs and the matching attention mask.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized or encoding fails
    /// - `ValidationError` if the encoding is empty or still longer than the model limit
    fn tokenize(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>), ClassifierError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;
        let max_length = self.max_sequence_length()
            .ok_or_else(|| ClassifierError::TokenizerError("Max sequence length not set".into()))?;

        let encoding = tokenizer.encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;
        let ids = encoding.get_ids();

        if ids.is_empty() {
            return Err(ClassifierError::ValidationError("Text produced no tokens".into()));
        }
        if ids.len() > max_length {
            return Err(ClassifierError::ValidationError(format!(
                "Input text too long: {} tokens (max: {})",
                ids.len(), max_length
            )));
        }

        let input_ids = ids.iter().map(|&id| id as i64).collect();
        let attention_mask = encoding.get_attention_mask().iter().map(|&m| m as i64).collect();
        Ok((input_ids, attention_mask))
    }

    /// Runs the model and returns the raw logits for a single sequence.
    ///
    /// # Errors
    /// - `ModelError` if the session is not initialized, tensors cannot be
    ///   built, the run fails, or the output has an unexpected shape
    fn get_logits(
        &self,
        input_ids: Vec<i64>,
        attention_mask: Vec<i64>,
    ) -> Result<Vec<f32>, ClassifierError> {
        let session = self.session()
            .ok_or_else(|| ClassifierError::ModelError("Session not initialized".into()))?;

        let seq_len = input_ids.len();
        let ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| {
                ClassifierError::ModelError(format!("Failed to create input array: {}", e))
            })?;
        let mask_array = Array2::from_shape_vec((1, seq_len), attention_mask)
            .map_err(|e| {
                ClassifierError::ModelError(format!("Failed to create mask array: {}", e))
            })?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert("input_ids", Tensor::from_array(ids_array)
            .map_err(|e| {
                ClassifierError::ModelError(format!("Failed to create input tensor: {}", e))
            })?);
        input_tensors.insert("attention_mask", Tensor::from_array(mask_array)
            .map_err(|e| {
                ClassifierError::ModelError(format!("Failed to create mask tensor: {}", e))
            })?);

        let outputs = session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e))
            })?;

        let shape = output_tensor.shape();
        if shape.len() != 2 || shape[0] != 1 {
            return Err(ClassifierError::ModelError(format!(
                "Expected logits of shape [1, num_labels], got {:?}", shape
            )));
        }

        Ok(output_tensor.iter().cloned().collect())
    }

    /// Tokenizes `text`, runs the model and returns one probability per output logit.
    fn predict_probabilities(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let (input_ids, attention_mask) = self.tokenize(text)?;
        let logits = self.get_logits(input_ids, attention_mask)?;
        Ok(softmax(&logits))
    }
}
