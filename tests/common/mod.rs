#![allow(dead_code)]

use moodlens::{ClassifierError, EmotionClassifier, LabelScore};
use std::sync::Mutex;

pub const LABELS: [&str; 6] = ["sadness", "joy", "love", "anger", "fear", "surprise"];

/// Test double that scores chunks by keyword and records every call.
///
/// A chunk containing "happy" is mostly joy, "gloomy" mostly sadness,
/// anything else a flat distribution. A chunk containing "explode" fails.
#[derive(Default)]
pub struct KeywordClassifier {
    pub calls: Mutex<Vec<String>>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl EmotionClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        self.calls.lock().unwrap().push(text.to_string());
        if text.contains("explode") {
            return Err(ClassifierError::PredictionError("model exploded".into()));
        }

        let scores: [f32; 6] = if text.contains("happy") {
            [0.05, 0.8, 0.05, 0.04, 0.03, 0.03]
        } else if text.contains("gloomy") {
            [0.7, 0.1, 0.05, 0.05, 0.05, 0.05]
        } else {
            [0.25, 0.15, 0.15, 0.15, 0.15, 0.15]
        };
        Ok(LABELS
            .iter()
            .zip(scores)
            .map(|(label, score)| LabelScore::new(*label, score))
            .collect())
    }

    fn labels(&self) -> Vec<String> {
        LABELS.iter().map(|l| l.to_string()).collect()
    }
}
