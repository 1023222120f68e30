//! HTTP routing tests against an in-memory database and a mock YouTube API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ksa_common::config::{AnalysisConfig, PredictionPolicy, PreprocessingConfig};
use ksa_common::db::init_memory_database;
use ksa_dash::nlp::{IdentityStemmer, TextPreprocessor};
use ksa_dash::services::YouTubeClient;
use ksa_dash::{build_router, AppState};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use tower::ServiceExt;

const TRAINING_CSV: &str = "comment,sentiment
Bagus keren mantap,positif
keren sekali bagus,positif
bagus suka keren video,positif
Suka bagus keren!,positif
mantap keren bagus suka,positif
jelek buruk kecewa,negatif
buruk sekali jelek,negatif
kecewa video jelek buruk,negatif
jelek kecewa buruk,negatif
buruk jelek benci,negatif
";

fn preprocessor() -> TextPreprocessor {
    TextPreprocessor::from_parts(Box::new(IdentityStemmer::new()), HashSet::new(), HashMap::new())
}

async fn youtube_server() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::UrlEncoded("id".into(), "abc123".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"items": [{"snippet": {"title": "T", "thumbnails": {
                "high": {"url": "http://img/high.jpg"}
            }}}]})
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/videos")
        .match_query(Matcher::UrlEncoded("id".into(), "missing".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/commentThreads")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"items": [
                {"snippet": {"topLevelComment": {"snippet": {
                    "textDisplay": "Videonya bagus, keren!", "authorDisplayName": "andi"}}}},
                {"snippet": {"topLevelComment": {"snippet": {
                    "textDisplay": "jelek dan buruk", "authorDisplayName": "budi"}}}}
            ]})
            .to_string(),
        )
        .create_async()
        .await;
    server
}

async fn test_state(youtube_url: Option<String>, policy: PredictionPolicy, allow_rerun: bool) -> AppState {
    let db = init_memory_database().await.unwrap();
    let youtube = youtube_url.map(|url| YouTubeClient::with_base_url("test-key", url).unwrap());
    AppState::new(db, preprocessor(), youtube)
        .with_analysis(AnalysisConfig {
            prediction_policy: policy,
            ..AnalysisConfig::default()
        })
        .with_preprocessing(PreprocessingConfig { allow_rerun })
}

async fn send(app: &Router, method: &str, uri: &str, body: Body, content_type: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, Body::empty(), "application/json").await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Body::from(body.to_string()), "application/json").await
}

async fn post_csv(app: &Router, uri: &str, csv: &str) -> (StatusCode, Value) {
    send(app, "POST", uri, Body::from(csv.to_string()), "text/csv").await
}

async fn count(db: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db)
        .await
        .unwrap()
}

/// Crawl abc123, upload and preprocess the training corpus
async fn prepared_app(server: &ServerGuard, policy: PredictionPolicy) -> (Router, SqlitePool) {
    let state = test_state(Some(server.url()), policy, false).await;
    let db = state.db.clone();
    let app = build_router(state);

    let (status, _) = post_json(&app, "/api/crawl", json!({"video_id": "abc123"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_csv(&app, "/api/training/upload", TRAINING_CSV).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/api/training/preprocess", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::OK);

    (app, db)
}

#[tokio::test]
async fn test_health_and_ui() {
    let app = build_router(test_state(None, PredictionPolicy::Reject, false).await);

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ksa-dash");
    assert_eq!(body["youtube_configured"], false);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("text/html"));

    let response = app
        .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_end_to_end_crawl_upload_preprocess() {
    let server = youtube_server().await;
    let state = test_state(Some(server.url()), PredictionPolicy::Reject, false).await;
    let db = state.db.clone();
    let app = build_router(state);

    let (status, body) = post_json(&app, "/api/crawl", json!({"video_id": "abc123"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video"]["title"], "T");
    assert_eq!(body["video"]["thumbnail_url"], "http://img/high.jpg");
    assert_eq!(body["comments_inserted"], 2);
    assert_eq!(count(&db, "video").await, 1);
    assert_eq!(count(&db, "comment").await, 2);
    let unlabeled: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment WHERE sentiment IS NULL")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(unlabeled, 2);

    let (status, body) = post_csv(&app, "/api/training/upload", TRAINING_CSV).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 10);
    assert_eq!(count(&db, "training").await, 10);

    let (status, body) = send(&app, "POST", "/api/training/preprocess", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "created");
    assert_eq!(count(&db, "preprocessed_training").await, 10);

    let (status, body) = send(&app, "POST", "/api/training/preprocess", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "skipped");
    assert_eq!(count(&db, "preprocessed_training").await, 10);

    let (status, body) = get(&app, "/api/training/preprocessed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["text"], "bagus keren mantap");

    let (status, body) = get(&app, "/api/videos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["video_id"], "abc123");
    assert_eq!(body[0]["comments"], 2);

    let (status, body) = get(&app, "/api/videos/abc123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 2);
    assert!(body["comments"][0]["sentiment"].is_null());
}

#[tokio::test]
async fn test_crawl_errors() {
    let app = build_router(test_state(None, PredictionPolicy::Reject, false).await);
    let (status, body) = post_json(&app, "/api/crawl", json!({"video_id": "abc123"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");

    let server = youtube_server().await;
    let app = build_router(test_state(Some(server.url()), PredictionPolicy::Reject, false).await);

    let (status, _) = post_json(&app, "/api/crawl", json!({"video_id": "bad id!"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(&app, "/api/crawl", json!({"video_id": "missing"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "VIDEO_NOT_FOUND");
}

#[tokio::test]
async fn test_training_upload_missing_column_is_rejected() {
    let state = test_state(None, PredictionPolicy::Reject, false).await;
    let db = state.db.clone();
    let app = build_router(state);

    let (status, body) = post_csv(&app, "/api/training/upload", "comment,label\nbagus,positif\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CSV");
    assert!(body["error"]["message"].as_str().unwrap().contains("sentiment"));
    assert_eq!(count(&db, "training").await, 0);
}

#[tokio::test]
async fn test_forced_preprocess_requires_allow_rerun() {
    let state = test_state(None, PredictionPolicy::Reject, false).await;
    let app = build_router(state);
    post_csv(&app, "/api/training/upload", TRAINING_CSV).await;

    let (status, body) = send(&app, "POST", "/api/training/preprocess?force=true", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["retryable"], false);

    let state = test_state(None, PredictionPolicy::Reject, true).await;
    let db = state.db.clone();
    let app = build_router(state);
    post_csv(&app, "/api/training/upload", TRAINING_CSV).await;
    send(&app, "POST", "/api/training/preprocess", Body::empty(), "text/plain").await;
    post_csv(&app, "/api/training/upload", "comment,sentiment\nbiasa saja,netral\n").await;

    let (status, body) = send(&app, "POST", "/api/training/preprocess?force=true", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "recomputed");
    assert_eq!(count(&db, "preprocessed_training").await, 11);
}

#[tokio::test]
async fn test_video_labels_and_preprocess() {
    let server = youtube_server().await;
    let (app, db) = prepared_app(&server, PredictionPolicy::Reject).await;

    let ids: Vec<i64> = sqlx::query_scalar("SELECT comment_id FROM comment ORDER BY comment_id")
        .fetch_all(&db)
        .await
        .unwrap();
    let csv = format!("comment_id,sentiment\n{},positif\n{},negatif\n", ids[0], ids[1]);
    let (status, body) = post_csv(&app, "/api/videos/abc123/labels", &csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 2);

    let (status, body) = post_csv(&app, "/api/videos/abc123/labels", "comment_id,sentiment\nabc,positif\n").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_CSV");

    let (status, body) = send(&app, "POST", "/api/videos/abc123/preprocess", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 2);

    let (status, body) = get(&app, "/api/videos/abc123/preprocessed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["text"], "videonya bagus keren");

    let (status, _) = send(&app, "POST", "/api/videos/nope/preprocess", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_and_report() {
    let server = youtube_server().await;
    let (app, db) = prepared_app(&server, PredictionPolicy::Reject).await;

    let ids: Vec<i64> = sqlx::query_scalar("SELECT comment_id FROM comment ORDER BY comment_id")
        .fetch_all(&db)
        .await
        .unwrap();
    let csv = format!("comment_id,sentiment\n{},positif\n", ids[0]);
    post_csv(&app, "/api/videos/abc123/labels", &csv).await;

    let (status, body) = send(&app, "POST", "/api/videos/abc123/analyze", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictions"], 2);
    let accuracy = body["evaluation"]["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(body["evaluation"]["cross_validation"]["std"].as_f64().unwrap() >= 0.0);

    let (status, body) = get(&app, "/api/videos/abc123/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distribution"]["positif"], 1);
    assert_eq!(body["distribution"]["negatif"], 1);
    assert_eq!(body["confusion_matrix"]["true_labels"], json!(["positif"]));
    assert_eq!(body["confusion_matrix"]["counts"], json!([[1]]));

    let (status, body) = send(&app, "POST", "/api/videos/abc123/analyze", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(count(&db, "prediction").await, 2);

    let (status, _) = get(&app, "/api/videos/nope/report").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_replace_and_append_policies() {
    let server = youtube_server().await;

    let (app, db) = prepared_app(&server, PredictionPolicy::Replace).await;
    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/api/videos/abc123/analyze", Body::empty(), "text/plain").await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(count(&db, "prediction").await, 2);
    let runs: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT run_id) FROM prediction")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(runs, 1);

    let (app, db) = prepared_app(&server, PredictionPolicy::Append).await;
    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/api/videos/abc123/analyze", Body::empty(), "text/plain").await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(count(&db, "prediction").await, 4);

    let (status, report) = get(&app, "/api/videos/abc123/report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["predictions"].as_array().unwrap().len(), 2);
    let counted: u64 = report["distribution"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(counted, 2);
}

#[tokio::test]
async fn test_analyze_with_too_little_training_data() {
    let server = youtube_server().await;
    let state = test_state(Some(server.url()), PredictionPolicy::Reject, false).await;
    let app = build_router(state);

    post_json(&app, "/api/crawl", json!({"video_id": "abc123"})).await;
    post_csv(&app, "/api/training/upload", "comment,sentiment\nbagus,positif\njelek,negatif\n").await;
    send(&app, "POST", "/api/training/preprocess", Body::empty(), "text/plain").await;

    let (status, body) = send(&app, "POST", "/api/videos/abc123/analyze", Body::empty(), "text/plain").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "CLASSIFIER_REJECTED");
}
