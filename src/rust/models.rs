/// Represents the available built-in models in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// DistilBERT fine-tuned for six-way emotion classification
    ///
    /// Characteristics:
    /// - Labels: sadness, joy, love, anger, fear, surprise
    /// - Max sequence length: 512
    /// - Size: ~255MB
    DistilBertEmotion,
}

/// Characteristics of a model including its capabilities and requirements
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCharacteristics {
    /// Labels in the order of the model's output logits
    pub labels: Vec<String>,
    /// Maximum sequence length the model can handle, in tokens
    pub max_sequence_length: usize,
    /// Approximate size of the model in memory
    pub model_size_mb: usize,
}

impl ModelCharacteristics {
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }
}

/// Where to fetch a model from and how to verify it.
///
/// Hashes are optional: when `None`, the downloaded file is accepted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub tokenizer_url: String,
    pub model_hash: Option<String>,
    pub tokenizer_hash: Option<String>,
}

const DISTILBERT_EMOTION_LABELS: [&str; 6] =
    ["sadness", "joy", "love", "anger", "fear", "surprise"];

impl BuiltinModel {
    /// Get the characteristics of the model
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::DistilBertEmotion => ModelCharacteristics {
                labels: DISTILBERT_EMOTION_LABELS.iter().map(|l| l.to_string()).collect(),
                max_sequence_length: 512,
                model_size_mb: 255,
            },
        }
    }

    /// Get the download locations for the model and tokenizer files.
    ///
    /// The default URLs are not pinned to a verified ONNX export. When they
    /// do not resolve, export the model locally
    /// (`optimum-cli export onnx --model bhadresh-savani/distilbert-base-uncased-emotion out/`)
    /// and load it with `--model-file`/`--tokenizer-file`, or point
    /// `--model-url`/`--tokenizer-url` at a mirror.
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            Self::DistilBertEmotion => ModelInfo {
                name: "distilbert-emotion".to_string(),
                model_url: "https://huggingface.co/bhadresh-savani/distilbert-base-uncased-emotion/resolve/main/onnx/model.onnx".to_string(),
                tokenizer_url: "https://huggingface.co/bhadresh-savani/distilbert-base-uncased-emotion/resolve/main/tokenizer.json".to_string(),
                model_hash: None,
                tokenizer_hash: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distilbert_characteristics() {
        let characteristics = BuiltinModel::DistilBertEmotion.characteristics();
        assert_eq!(characteristics.num_labels(), 6);
        assert_eq!(characteristics.labels[1], "joy");
        assert_eq!(characteristics.max_sequence_length, 512);
    }

    #[test]
    fn test_model_info_name() {
        let info = BuiltinModel::DistilBertEmotion.get_model_info();
        assert_eq!(info.name, "distilbert-emotion");
        assert!(info.model_url.ends_with("model.onnx"));
        assert!(info.tokenizer_url.ends_with("tokenizer.json"));
    }
}
