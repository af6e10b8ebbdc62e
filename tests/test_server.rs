//! Integration test: Prediction API endpoints

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use credit_score::export::ArtifactBundle;
use credit_score::inference::CreditModel;
use credit_score::preprocessing::{FieldEncoders, LabelEncoder};
use credit_score::server::{create_router, AppState, ServerConfig};
use credit_score::training::{CreditClassifier, KNNClassifier, TrainEngine, TrainingConfig};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn config_for(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        models_dir: dir.to_path_buf(),
        cors_origin: None,
    }
}

fn app_for(dir: &Path) -> axum::Router {
    let config = config_for(dir);
    let state = Arc::new(AppState::new(dir));
    create_router(state, &config)
}

fn trained_models_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let engine = TrainEngine::new(TrainingConfig::new().with_n_estimators(15));
    let outcome = engine.train(&common::customer_frame(90)).unwrap();
    outcome.bundle.save(dir.path()).unwrap();
    dir
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_json(app: &axum::Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn record_json(row: usize) -> String {
    serde_json::to_string(&common::record_like(row)).unwrap()
}

#[tokio::test]
async fn test_health_without_model() {
    let dir = TempDir::new().unwrap();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_predict_without_model_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let app = app_for(dir.path());

    let (status, body) = post_json(&app, "/predict", record_json(0)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], true);

    // Availability is checked before the body is validated
    let (status, _) = post_json(&app, "/predict", "{}".to_string()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_with_model() {
    let dir = trained_models_dir();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], true);
    assert!(body["model"]["run_id"].as_str().is_some());
}

#[tokio::test]
async fn test_predict_returns_known_label() {
    let dir = trained_models_dir();
    let app = app_for(dir.path());

    let (status, body) = post_json(&app, "/predict", record_json(4)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let label = body["prediction"].as_str().unwrap();
    assert!(["Good", "Poor", "Standard"].contains(&label));
}

#[tokio::test]
async fn test_predict_is_deterministic() {
    let dir = trained_models_dir();
    let app = app_for(dir.path());

    let (_, first) = post_json(&app, "/predict", record_json(7)).await;
    let (_, second) = post_json(&app, "/predict", record_json(7)).await;
    assert_eq!(first["prediction"], second["prediction"]);
}

#[tokio::test]
async fn test_unseen_category_still_predicts() {
    let dir = trained_models_dir();
    let app = app_for(dir.path());

    let mut record = common::record_like(2);
    record.profissao = "Astronauta".to_string();
    record.mix_credito = "Inexistente".to_string();

    let (status, body) = post_json(&app, "/predict", serde_json::to_string(&record).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["prediction"].is_string());
}

#[tokio::test]
async fn test_inference_failure_hides_cause() {
    // A classifier that was never fitted fails at prediction time
    let bundle = ArtifactBundle::new(
        CreditClassifier::KNearestNeighbors(KNNClassifier::with_k(5)),
        FieldEncoders::new(),
        LabelEncoder::fit(["Good", "Poor", "Standard"]).unwrap(),
        vec!["idade".to_string(), "salario_anual".to_string()],
    );
    let model = CreditModel::from_bundle(bundle).unwrap();

    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path());
    let app = create_router(Arc::new(AppState::with_model(model)), &config);

    let (status, body) = post_json(&app, "/predict", record_json(3)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], true);
    let message = body["message"].as_str().unwrap();
    assert!(!message.to_lowercase().contains("fitted"));
    assert!(!message.contains("idade"));
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let dir = trained_models_dir();
    let app = app_for(dir.path());

    let mut value: Value = serde_json::from_str(&record_json(1)).unwrap();
    value.as_object_mut().unwrap().remove("idade");
    let (status, body) = post_json(&app, "/predict", value.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], true);

    let mut value: Value = serde_json::from_str(&record_json(1)).unwrap();
    value["salario_anual"] = Value::String("muito".into());
    let (status, _) = post_json(&app, "/predict", value.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_json(&app, "/predict", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mixed_artifacts_start_unloaded() {
    let first = trained_models_dir();
    let second = trained_models_dir();
    std::fs::copy(
        second.path().join("encoders.json"),
        first.path().join("encoders.json"),
    )
    .unwrap();

    let app = app_for(first.path());
    let (_, body) = get(&app, "/").await;
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let dir = TempDir::new().unwrap();
    let app = app_for(dir.path());

    let (status, body) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);

    let (status, _) = get(&app, "/predict").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
