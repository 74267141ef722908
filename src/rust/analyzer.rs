//! Bulk mood analysis: chunking, per-chunk classification and score aggregation.
//!
//! Each item's text is trimmed, split into fixed-size character chunks, and
//! every chunk is classified independently. Label scores are averaged over
//! the number of chunks, the best label becomes the item's mood, and all
//! reported numbers are rounded to three decimals.

use log::{debug, info};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::classifier::{ClassifierError, EmotionClassifier, LabelScore};

/// Mood reported for items whose text is empty after trimming.
pub const SENTINEL_MOOD: &str = "nonchalantahh";

/// Character limit of a single chunk handed to the classifier.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Classification failed: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("Classifier returned no labels")]
    NoLabels,
    #[error("Invalid analyzer configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub max_chunk_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

/// One caller-supplied item. `id` is echoed back untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisRequestItem {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub text: String,
}

impl AnalysisRequestItem {
    pub fn new(id: impl Into<serde_json::Value>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Label → score pairs in emission order, serialized as a JSON object.
///
/// Analyzer output is always sorted by descending score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodScores(Vec<(String, f64)>);

impl MoodScores {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(l, s)| (l.as_str(), *s))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(String, f64)>> for MoodScores {
    fn from(pairs: Vec<(String, f64)>) -> Self {
        Self(pairs)
    }
}

impl Serialize for MoodScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, score) in &self.0 {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MoodScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = MoodScores;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, score)) = access.next_entry::<String, f64>()? {
                    pairs.push((label, score));
                }
                Ok(MoodScores(pairs))
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// Aggregated classification of one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub mood: String,
    pub confidence: f64,
    pub scores: MoodScores,
}

impl MoodSummary {
    pub fn sentinel() -> Self {
        Self {
            mood: SENTINEL_MOOD.to_string(),
            confidence: 0.0,
            scores: MoodScores::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResultItem {
    pub id: serde_json::Value,
    pub mood: String,
    pub confidence: f64,
    pub scores: MoodScores,
}

impl AnalysisResultItem {
    fn from_summary(id: serde_json::Value, summary: MoodSummary) -> Self {
        Self {
            id,
            mood: summary.mood,
            confidence: summary.confidence,
            scores: summary.scores,
        }
    }
}

/// Strips surrounding whitespace, counting the ASCII information separators
/// (`\x1c`..=`\x1f`) as whitespace too.
pub fn strip_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Splits `text` into consecutive chunks of at most `max_chars` characters.
///
/// Chunks never split a UTF-8 character and concatenate back to `text`.
/// An empty `text` yields no chunks.
///
/// # Panics
/// If `max_chars` is zero.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    assert!(max_chars > 0, "chunk size must be positive");

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Averages label scores over `chunk_results` and picks the top label.
///
/// Each label's summed score is divided by the number of chunk results, so
/// a label missing from some chunks is averaged as if it scored zero there.
/// Ties, both for the mood and in the score ordering, go to the label seen
/// first.
pub fn aggregate_chunk_scores(
    chunk_results: &[Vec<LabelScore>],
) -> Result<MoodSummary, AnalyzerError> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for result in chunk_results {
        for LabelScore { label, score } in result {
            match positions.get(label.as_str()) {
                Some(&i) => totals[i].1 += f64::from(*score),
                None => {
                    positions.insert(label.as_str(), totals.len());
                    totals.push((label.clone(), f64::from(*score)));
                }
            }
        }
    }

    if totals.is_empty() {
        return Err(AnalyzerError::NoLabels);
    }

    let divisor = chunk_results.len() as f64;
    for (_, total) in totals.iter_mut() {
        *total /= divisor;
    }

    // Stable sort: equal scores keep first-seen order
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (mood, top) = totals[0].clone();
    let scores = totals
        .into_iter()
        .map(|(label, score)| (label, round3(score)))
        .collect::<Vec<_>>();

    Ok(MoodSummary {
        mood,
        confidence: round3(top),
        scores: MoodScores(scores),
    })
}

/// Classifies batches of text items with a shared, read-only classifier.
#[derive(Clone)]
pub struct MoodAnalyzer {
    classifier: Arc<dyn EmotionClassifier>,
    config: AnalyzerConfig,
}

impl fmt::Debug for MoodAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoodAnalyzer")
            .field("labels", &self.classifier.labels())
            .field("config", &self.config)
            .finish()
    }
}

impl MoodAnalyzer {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        config: AnalyzerConfig,
    ) -> Result<Self, AnalyzerError> {
        if config.max_chunk_chars == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_chunk_chars must be greater than 0".into(),
            ));
        }
        Ok(Self { classifier, config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes a single text. Empty or whitespace-only text yields the
    /// sentinel summary without calling the classifier.
    pub fn analyze_text(&self, text: &str) -> Result<MoodSummary, AnalyzerError> {
        let text = strip_text(text);
        if text.is_empty() {
            return Ok(MoodSummary::sentinel());
        }

        let chunks = chunk_text(text, self.config.max_chunk_chars);
        let mut chunk_results = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!(
                "Classifying chunk {}/{} ({} chars)",
                i + 1,
                chunks.len(),
                chunk.chars().count()
            );
            chunk_results.push(self.classifier.classify(chunk)?);
        }

        aggregate_chunk_scores(&chunk_results)
    }

    pub fn analyze_item(
        &self,
        item: &AnalysisRequestItem,
    ) -> Result<AnalysisResultItem, AnalyzerError> {
        let summary = self.analyze_text(&item.text)?;
        Ok(AnalysisResultItem::from_summary(item.id.clone(), summary))
    }

    /// Analyzes `items` in order. The first failing item aborts the batch.
    pub fn analyze_bulk(
        &self,
        items: &[AnalysisRequestItem],
    ) -> Result<Vec<AnalysisResultItem>, AnalyzerError> {
        let start = Instant::now();
        let results = items
            .iter()
            .map(|item| self.analyze_item(item))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Analyzed {} items in {:.2?}", results.len(), start.elapsed());
        Ok(results)
    }
}
