use std::sync::Arc;

use super::config::ServerConfig;
use crate::analyzer::MoodAnalyzer;

/// Shared application state. Read-only after startup.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub analyzer: MoodAnalyzer,
}

impl ServerState {
    pub fn new(config: ServerConfig, analyzer: MoodAnalyzer) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }
}
