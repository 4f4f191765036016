// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect endpoint handler

use std::time::Instant;

use axum::{
    extract::{Request, State},
    Json,
};
use tracing::{debug, error, info, warn};

use super::request::extract_image_payload;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::detection::{ingest, DetectError, DetectionResponse};

/// POST {detect_path} - Detect objects in an image
///
/// Accepts either a multipart upload or a JSON body and returns every
/// detection the model reports above the confidence threshold.
///
/// # Request
/// - multipart/form-data with the image file in the `image` field, or
/// - application/json `{"image_base64": "<base64 image bytes>"}`
///
/// When both could apply, the multipart field wins.
///
/// # Response
/// - `detections`: list of `{id, class_id, class_name, confidence, bbox}`
/// - `image_width`, `image_height`: decoded image dimensions
///
/// # Errors
/// - 400 Bad Request: no image provided, or the bytes are not a decodable image
/// - 500 Internal Server Error: inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<DetectionResponse>, ApiError> {
    let started = Instant::now();

    let payload = extract_image_payload(request, state.body_limit)
        .await
        .map_err(|e| reject(e, state.redact_errors))?;

    if let Some(payload) = payload.as_ref() {
        debug!("Detect request received ({} payload)", payload.encoding());
    }

    let normalizer = state.normalizer.clone();
    let max_image_bytes = state.max_image_bytes;
    let outcome = tokio::task::spawn_blocking(move || {
        let raster = ingest(payload, max_image_bytes)?;
        normalizer.detect(&raster)
    })
    .await
    .map_err(|e| {
        error!("Detection task failed: {}", e);
        ApiError::InternalError("Detection task failed".to_string())
    })?;

    let response = outcome.map_err(|e| reject(e, state.redact_errors))?;

    info!(
        "Detection complete: {} objects in {}x{} image, {}ms",
        response.detections.len(),
        response.image_width,
        response.image_height,
        started.elapsed().as_millis()
    );

    Ok(Json(response))
}

fn reject(err: DetectError, redact: bool) -> ApiError {
    if err.is_client_error() {
        warn!("Detect request rejected: {}", err);
    } else {
        error!("Detection failed: {}", err);
    }
    ApiError::from_detect_error(err, redact)
}
