mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::KeywordClassifier;
use http_body_util::BodyExt;
use moodlens::server::routes::{INVALID_ITEMS_MESSAGE, RUNNING_MESSAGE};
use moodlens::server::ServerState;
use moodlens::{
    build_router, AnalysisResultItem, AnalyzerConfig, MoodAnalyzer, ServerConfig, SENTINEL_MOOD,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn setup_app() -> (Router, Arc<KeywordClassifier>) {
    let classifier = Arc::new(KeywordClassifier::new());
    let analyzer = MoodAnalyzer::new(classifier.clone(), AnalyzerConfig::default()).unwrap();
    let state = Arc::new(ServerState::new(ServerConfig::default(), analyzer));
    (build_router(state), classifier)
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze_bulk")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_index_reports_running() {
    let (app, _) = setup_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, json!({ "message": RUNNING_MESSAGE }));
}

#[tokio::test]
async fn test_empty_text_returns_sentinel() {
    let (app, classifier) = setup_app();
    let (status, body) = send(app, post_json(r#"{"items":[{"id":"1","text":""}]}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"id":"1","mood":"nonchalantahh","confidence":0.0,"scores":{}}]"#);
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_whitespace_text_returns_sentinel() {
    let (app, classifier) = setup_app();
    let (status, body) = send(app, post_json(r#"{"items":[{"id":"w","text":"  \n\t "}]}"#)).await;

    assert_eq!(status, StatusCode::OK);
    let results: Vec<AnalysisResultItem> = serde_json::from_str(&body).unwrap();
    assert_eq!(results[0].mood, SENTINEL_MOOD);
    assert!(results[0].scores.is_empty());
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_empty_items_returns_empty_array() {
    let (app, _) = setup_app();
    let (status, body) = send(app, post_json(r#"{"items":[]}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_missing_items_is_bad_request() {
    for payload in ["{}", r#"{"items":{"id":"1"}}"#, "not json at all"] {
        let (app, classifier) = setup_app();
        let (status, body) = send(app, post_json(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({ "error": INVALID_ITEMS_MESSAGE }));
        assert_eq!(classifier.call_count(), 0);
    }
}

#[tokio::test]
async fn test_single_chunk_result() {
    let (app, classifier) = setup_app();
    let payload = r#"{"items":[{"id":"a","text":"  so happy today  "}]}"#;
    let (status, body) = send(app, post_json(payload)).await;

    assert_eq!(status, StatusCode::OK);
    let results: Vec<AnalysisResultItem> = serde_json::from_str(&body).unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.id, json!("a"));
    assert_eq!(result.mood, "joy");
    assert_eq!(result.confidence, 0.8);
    assert_eq!(
        result.scores.labels(),
        vec!["joy", "sadness", "love", "anger", "fear", "surprise"]
    );
    assert_eq!(classifier.calls(), vec!["so happy today".to_string()]);
}

#[tokio::test]
async fn test_long_text_is_averaged_over_two_chunks() {
    let (app, classifier) = setup_app();
    let text = format!("happy{}gloomy{}", "x".repeat(507), "y".repeat(482));
    assert_eq!(text.chars().count(), 1000);

    let payload = json!({ "items": [{ "id": "long", "text": text }] }).to_string();
    let (status, body) = send(app, post_json(payload)).await;

    assert_eq!(status, StatusCode::OK);
    let calls = classifier.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].chars().count(), 512);
    assert_eq!(calls.concat(), text);

    let results: Vec<AnalysisResultItem> = serde_json::from_str(&body).unwrap();
    let result = &results[0];
    assert_eq!(result.mood, "joy");
    assert_eq!(result.confidence, 0.45);
    assert_eq!(result.scores.get("sadness"), Some(0.375));
    assert_eq!(result.scores.get("anger"), Some(0.045));
    assert_eq!(
        result.scores.labels(),
        vec!["joy", "sadness", "love", "anger", "fear", "surprise"]
    );
}

#[tokio::test]
async fn test_results_preserve_order_and_count() {
    let (app, _) = setup_app();
    let payload = json!({
        "items": [
            { "id": "3", "text": "gloomy weather" },
            { "id": "1", "text": "" },
            { "id": "2", "text": "happy news" },
            { "text": "no id here" },
        ]
    })
    .to_string();
    let (status, body) = send(app, post_json(payload)).await;

    assert_eq!(status, StatusCode::OK);
    let results: Vec<AnalysisResultItem> = serde_json::from_str(&body).unwrap();
    let ids: Vec<Value> = results.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![json!("3"), json!("1"), json!("2"), Value::Null]);
    assert_eq!(results[0].mood, "sadness");
    assert_eq!(results[1].mood, SENTINEL_MOOD);
    assert_eq!(results[2].mood, "joy");
    assert_eq!(results[3].mood, "sadness");

    for result in results.iter().filter(|r| r.mood != SENTINEL_MOOD) {
        assert_eq!(result.scores.get(&result.mood), Some(result.confidence));
        let values: Vec<f64> = result.scores.iter().map(|(_, s)| s).collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
        for value in values {
            assert_eq!((value * 1000.0).round() / 1000.0, value);
        }
    }
}

#[tokio::test]
async fn test_classifier_failure_aborts_batch() {
    let (app, classifier) = setup_app();
    let payload = json!({
        "items": [
            { "id": "1", "text": "happy" },
            { "id": "2", "text": "this will explode" },
            { "id": "3", "text": "happy again" },
        ]
    })
    .to_string();
    let (status, body) = send(app, post_json(payload)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert!(value["error"].as_str().unwrap().contains("model exploded"));
    assert_eq!(classifier.call_count(), 2);
}

#[tokio::test]
async fn test_malformed_item_is_server_error() {
    let (app, classifier) = setup_app();
    let (status, _) = send(app, post_json(r#"{"items":["just a string"]}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(classifier.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = setup_app();
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let (app, _) = setup_app();
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_batch_larger_than_two_mib_is_accepted() {
    let (app, classifier) = setup_app();
    let text = "happy ".repeat(700);
    let items: Vec<Value> = (0..600).map(|i| json!({ "id": i, "text": text })).collect();
    let payload = serde_json::to_vec(&json!({ "items": items })).unwrap();
    assert!(payload.len() > 2 * 1024 * 1024);

    let (status, body) = send(app, post_json(payload)).await;

    assert_eq!(status, StatusCode::OK);
    let results: Vec<AnalysisResultItem> = serde_json::from_str(&body).unwrap();
    assert_eq!(results.len(), 600);
    assert_eq!(results[599].id, json!(599));
    assert!(results.iter().all(|r| r.mood == "joy"));
    // 4199 trimmed chars per item -> 9 chunks each
    assert_eq!(classifier.call_count(), 600 * 9);
}
