// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect request extraction
//!
//! Pulls the image payload out of either a multipart upload (`image` field)
//! or a JSON body (`image_base64` field). Decoding happens later.

use axum::{
    body::to_bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};

use crate::detection::{DetectError, ImagePayload, UPLOAD_FIELD};

/// JSON form of a detect request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Base64-encoded image bytes
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl DetectRequest {
    pub fn into_payload(self) -> Option<ImagePayload> {
        self.image_base64.map(ImagePayload::Base64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Json,
    Other,
}

fn body_kind(request: &Request) -> BodyKind {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    let mime = content_type.split(';').next().unwrap_or("").trim();

    if mime == "multipart/form-data" {
        BodyKind::Multipart
    } else if mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json")) {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

/// Extract the image payload from a detect request
///
/// `Ok(None)` means the request carried neither accepted form.
pub async fn extract_image_payload(
    request: Request,
    body_limit: usize,
) -> Result<Option<ImagePayload>, DetectError> {
    match body_kind(&request) {
        BodyKind::Multipart => extract_multipart(request).await,
        BodyKind::Json => extract_json(request, body_limit).await,
        BodyKind::Other => Ok(None),
    }
}

async fn extract_multipart(request: Request) -> Result<Option<ImagePayload>, DetectError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| DetectError::InvalidInput(format!("Invalid multipart body: {}", e)))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DetectError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await.map_err(|e| {
                DetectError::InvalidInput(format!("Failed to read image field: {}", e))
            })?;
            return Ok(Some(ImagePayload::Upload(bytes)));
        }
    }

    Ok(None)
}

async fn extract_json(
    request: Request,
    body_limit: usize,
) -> Result<Option<ImagePayload>, DetectError> {
    let body = to_bytes(request.into_body(), body_limit)
        .await
        .map_err(|e| DetectError::InvalidInput(format!("Failed to read request body: {}", e)))?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| DetectError::InvalidInput(format!("Invalid JSON body: {}", e)))?;

    // Only an object can carry the `image_base64` field
    if !value.is_object() {
        return Ok(None);
    }

    let request: DetectRequest = serde_json::from_value(value)
        .map_err(|e| DetectError::InvalidInput(format!("Invalid JSON body: {}", e)))?;

    Ok(request.into_payload())
}
