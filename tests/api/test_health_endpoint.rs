// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use fabstir_detect_node::{
    api::http_server::{create_app, AppState},
    config::DetectNodeConfig,
    detection::{DetectionNormalizer, MockInferenceBackend},
    vision::ClassLabels,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

#[tokio::test]
async fn test_health_returns_ok() {
    let labels = ClassLabels::from_names(["person"]).unwrap();
    let backend = Arc::new(MockInferenceBackend::empty());
    let normalizer = DetectionNormalizer::new(backend.clone(), Arc::new(labels));
    let app = create_app(AppState::with_normalizer(normalizer, &DetectNodeConfig::default()));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
    assert_eq!(backend.call_count(), 0);
}
