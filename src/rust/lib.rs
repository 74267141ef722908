//! Bulk emotion analysis over an ONNX text classifier, exposed over HTTP.
//!
//! Long texts are split into fixed-size character chunks, each chunk is
//! classified independently, and per-label scores are averaged over the
//! chunks to give one mood per item.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use moodlens::{AnalyzerConfig, BuiltinModel, Classifier, MoodAnalyzer};
//! use std::sync::Arc;
//!
//! let classifier = Classifier::builder()
//!     .with_model(BuiltinModel::DistilBertEmotion)?
//!     .build()?;
//! let analyzer = MoodAnalyzer::new(Arc::new(classifier), AnalyzerConfig::default())?;
//!
//! let summary = analyzer.analyze_text("What a wonderful surprise!")?;
//! println!("{} ({:.3})", summary.mood, summary.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! Any type implementing [`EmotionClassifier`] can stand in for the ONNX
//! model, which is how the tests drive the analyzer and the HTTP routes.

pub mod analyzer;
pub mod classifier;
pub mod model_manager;
pub mod models;
mod runtime;
pub mod server;

pub use analyzer::{
    aggregate_chunk_scores, chunk_text, strip_text, AnalysisRequestItem, AnalysisResultItem,
    AnalyzerConfig, AnalyzerError, MoodAnalyzer, MoodScores, MoodSummary, DEFAULT_MAX_CHUNK_CHARS,
    SENTINEL_MOOD,
};
pub use classifier::{
    Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, EmotionClassifier, LabelScore,
};
pub use model_manager::{ModelError, ModelManager};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use runtime::{create_session_builder, RuntimeConfig};
pub use server::{build_router, start_server, ServerConfig, ServerError};

pub fn init_logger() {
    env_logger::init();
}
