// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detect endpoint tests
//!
//! Drives the router with a mock inference backend:
//! - multipart and base64 inputs produce the same response
//! - missing or undecodable images are rejected before inference
//! - backend failures surface as 500 with an error message

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use fabstir_detect_node::{
    api::http_server::{create_app, AppState},
    config::DetectNodeConfig,
    detection::{DetectionNormalizer, MockInferenceBackend, RawDetection},
    vision::ClassLabels,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{json, Value};
use tower::util::ServiceExt;

const BOUNDARY: &str = "detect-test-boundary";

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([90, 120, 200])));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

fn labels() -> ClassLabels {
    ClassLabels::from_names(["person", "bicycle", "car", "dog", "cat"]).unwrap()
}

fn cat_backend() -> Arc<MockInferenceBackend> {
    Arc::new(MockInferenceBackend::with_detections(vec![RawDetection::new(
        4,
        0.8123,
        [10.5, 20.25, 110.5, 220.75],
    )]))
}

fn app_with_labels(
    backend: Arc<MockInferenceBackend>,
    labels: ClassLabels,
    config: &DetectNodeConfig,
) -> Router {
    let normalizer = DetectionNormalizer::new(backend, Arc::new(labels))
        .with_confidence_threshold(config.confidence_threshold);
    create_app(AppState::with_normalizer(normalizer, config))
}

fn app_with(backend: Arc<MockInferenceBackend>, config: &DetectNodeConfig) -> Router {
    app_with_labels(backend, labels(), config)
}

fn app(backend: Arc<MockInferenceBackend>) -> Router {
    app_with(backend, &DetectNodeConfig::default())
}

fn multipart_request(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"photo.jpg\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_multipart_cat_detection() {
    let backend = cat_backend();
    let (status, body) = send(
        app(backend.clone()),
        multipart_request("/detect", "image", &jpeg_bytes(640, 480)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_width"], 640);
    assert_eq!(body["image_height"], 480);

    let detections = body["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 1);
    let cat = &detections[0];
    assert_eq!(cat["id"], 0);
    assert_eq!(cat["class_id"], 4);
    assert_eq!(cat["class_name"], "cat");
    assert!((cat["confidence"].as_f64().unwrap() - 0.8123).abs() < 1e-4);
    assert_eq!(cat["bbox"]["x1"], 10.5);
    assert_eq!(cat["bbox"]["y1"], 20.25);
    assert_eq!(cat["bbox"]["x2"], 110.5);
    assert_eq!(cat["bbox"]["y2"], 220.75);
    assert_eq!(cat["bbox"]["width"], 100.0);
    assert_eq!(cat["bbox"]["height"], 200.5);

    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.last_threshold(), Some(0.25));
}

#[tokio::test]
async fn test_base64_matches_multipart() {
    let image = jpeg_bytes(320, 240);

    let (multipart_status, multipart_body) =
        send(app(cat_backend()), multipart_request("/detect", "image", &image)).await;
    let (json_status, json_body) = send(
        app(cat_backend()),
        json_request("/detect", json!({ "image_base64": STANDARD.encode(&image) })),
    )
    .await;

    assert_eq!(multipart_status, StatusCode::OK);
    assert_eq!(json_status, StatusCode::OK);
    assert_eq!(multipart_body, json_body);
}

#[tokio::test]
async fn test_no_detections() {
    let backend = Arc::new(MockInferenceBackend::empty());
    let (status, body) = send(
        app(backend),
        multipart_request("/detect", "image", &jpeg_bytes(64, 48)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "detections": [], "image_width": 64, "image_height": 48 })
    );
}

#[tokio::test]
async fn test_missing_detection_list_is_empty() {
    let backend = Arc::new(MockInferenceBackend::without_detection_list());
    let (status, body) = send(
        app(backend),
        multipart_request("/detect", "image", &jpeg_bytes(32, 32)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detections"], json!([]));
}

#[tokio::test]
async fn test_no_image_provided() {
    let requests = vec![
        json_request("/detect", json!({})),
        json_request("/detect", json!({ "image": "abc" })),
        multipart_request("/detect", "file", &jpeg_bytes(16, 16)),
        Request::builder()
            .method(Method::POST)
            .uri("/detect")
            .body(Body::empty())
            .unwrap(),
    ];

    for request in requests {
        let backend = cat_backend();
        let (status, body) = send(app(backend.clone()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No image provided" }));
        assert_eq!(backend.call_count(), 0);
    }
}

#[tokio::test]
async fn test_invalid_base64_is_bad_request() {
    let backend = cat_backend();
    let (status, body) = send(
        app(backend.clone()),
        json_request("/detect", json!({ "image_base64": "not base64 at all!!" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_undecodable_upload_is_bad_request() {
    let backend = cat_backend();
    let (status, body) = send(
        app(backend.clone()),
        multipart_request("/detect", "image", b"definitely not an image"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image"));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_server_error() {
    let backend = Arc::new(MockInferenceBackend::failing("session exploded"));
    let (status, body) = send(
        app(backend.clone()),
        multipart_request("/detect", "image", &jpeg_bytes(32, 32)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("session exploded"));
    assert!(body.get("detections").is_none());
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_backend_failure_redacted() {
    let config = DetectNodeConfig {
        redact_errors: true,
        ..Default::default()
    };
    let backend = Arc::new(MockInferenceBackend::failing("session exploded"));
    let (status, body) = send(
        app_with(backend, &config),
        multipart_request("/detect", "image", &jpeg_bytes(32, 32)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "inference failed" }));
}

#[tokio::test]
async fn test_custom_detect_path_and_threshold() {
    let config = DetectNodeConfig {
        detect_path: "/predict".to_string(),
        confidence_threshold: 0.6,
        ..Default::default()
    };
    let backend = cat_backend();
    let router = app_with(backend.clone(), &config);

    let (status, _) = send(
        router.clone(),
        multipart_request("/predict", "image", &jpeg_bytes(32, 32)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.last_threshold(), Some(0.6));

    let (status, _) = send(
        router,
        multipart_request("/detect", "image", &jpeg_bytes(32, 32)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detect_rejects_get() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/detect")
        .body(Body::empty())
        .unwrap();
    let response = app(cat_backend()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_single_cat_response_is_exact() {
    let labels = ClassLabels::from_names(["person", "dog", "cat"]).unwrap();
    let backend = Arc::new(MockInferenceBackend::with_detections(vec![RawDetection::new(
        2,
        0.91,
        [10.0, 20.0, 110.0, 220.0],
    )]));
    let router = app_with_labels(backend.clone(), labels, &DetectNodeConfig::default());

    let (status, body) = send(
        router,
        multipart_request("/detect", "image", &jpeg_bytes(640, 480)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "detections": [{
                "id": 0,
                "class_id": 2,
                "class_name": "cat",
                "confidence": 0.91,
                "bbox": {
                    "x1": 10.0, "y1": 20.0, "x2": 110.0, "y2": 220.0,
                    "width": 100.0, "height": 200.0
                }
            }],
            "image_width": 640,
            "image_height": 480
        })
    );
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_json_array_body_is_no_image() {
    let backend = cat_backend();
    let image = STANDARD.encode(jpeg_bytes(32, 32));
    let (status, body) = send(app(backend.clone()), json_request("/detect", json!([image]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No image provided" }));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_base64_of_non_image_bytes_is_bad_request() {
    let backend = cat_backend();
    let (status, body) = send(
        app(backend.clone()),
        json_request(
            "/detect",
            json!({ "image_base64": STANDARD.encode(b"plain text, not pixels") }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image"));
    assert_eq!(backend.call_count(), 0);
}
