// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image ingestion: turns an extracted request payload into a raster

use bytes::Bytes;
use tracing::debug;

use super::error::DetectError;
use crate::vision::{decode_base64_image, decode_image_bytes, Raster};

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "image";

/// Image payload in one of the two accepted encodings
#[derive(Debug, Clone)]
pub enum ImagePayload {
    /// Raw bytes from the multipart `image` field
    Upload(Bytes),
    /// Base64 string from the JSON `image_base64` field
    Base64(String),
}

impl ImagePayload {
    pub fn encoding(&self) -> &'static str {
        match self {
            ImagePayload::Upload(_) => "multipart",
            ImagePayload::Base64(_) => "base64",
        }
    }
}

/// Decode a payload into an RGB raster
///
/// `None` means neither accepted form was present. Never reaches the
/// inference backend.
pub fn ingest(payload: Option<ImagePayload>, max_image_bytes: usize) -> Result<Raster, DetectError> {
    let payload = payload.ok_or_else(DetectError::no_image)?;

    let raster = match &payload {
        ImagePayload::Upload(bytes) => decode_image_bytes(bytes, max_image_bytes)?,
        ImagePayload::Base64(encoded) => decode_base64_image(encoded, max_image_bytes)?,
    };

    debug!(
        "Ingested {} image: {}x{}",
        payload.encoding(),
        raster.width(),
        raster.height()
    );

    Ok(raster)
}
