use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use super::error::{ServerError, ServerResult};
use super::state::ServerState;
use crate::analyzer::{AnalysisRequestItem, AnalysisResultItem};

pub const INVALID_ITEMS_MESSAGE: &str = "Missing or invalid 'items' list.";
pub const RUNNING_MESSAGE: &str = "MoodLens Emotion API is running!";

/// Liveness check
pub async fn index() -> Json<Value> {
    Json(json!({ "message": RUNNING_MESSAGE }))
}

/// Extracts the `items` array from a raw request body.
///
/// A body that is not a JSON object with an `items` array is a client error.
/// An entry that cannot be read as an item (not an object, non-string
/// `text`) is an internal error and fails the whole batch.
pub fn parse_items(body: &[u8]) -> ServerResult<Vec<AnalysisRequestItem>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ServerError::BadRequest(INVALID_ITEMS_MESSAGE.to_string()))?;
    let items = value
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| ServerError::BadRequest(INVALID_ITEMS_MESSAGE.to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            AnalysisRequestItem::deserialize(item).map_err(|e| {
                ServerError::Internal(format!("Invalid item at position {}: {}", i, e))
            })
        })
        .collect()
}

/// `POST /analyze_bulk`
pub async fn analyze_bulk(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<Vec<AnalysisResultItem>>> {
    let items = parse_items(&body)?;
    log::info!("Received {} items for analysis", items.len());

    let analyzer = state.analyzer.clone();
    let results = tokio::task::spawn_blocking(move || analyzer.analyze_bulk(&items))
        .await
        .map_err(|e| ServerError::Internal(format!("Analysis task failed: {}", e)))??;

    Ok(Json(results))
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Logs method, path, status and latency of every request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}
