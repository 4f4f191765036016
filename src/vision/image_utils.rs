// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding for detection requests

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use thiserror::Error;

use super::raster::Raster;

/// Default maximum decoded image size (10MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Errors raised while turning request bytes into a raster
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Decode a base64-encoded image into an RGB raster
///
/// ASCII whitespace inside the payload (line-wrapped base64) is ignored.
pub fn decode_base64_image(base64_str: &str, max_bytes: usize) -> Result<Raster, ImageError> {
    let compact: String = base64_str
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let bytes = STANDARD.decode(compact)?;
    decode_image_bytes(&bytes, max_bytes)
}

/// Decode raw image bytes (multipart uploads) into an RGB raster
pub fn decode_image_bytes(bytes: &[u8], max_bytes: usize) -> Result<Raster, ImageError> {
    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(bytes.len(), max_bytes));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    Raster::from_dynamic(img)
}

/// Detect image format from its signature
///
/// Covers every format the `image` codecs can sniff (PNG, JPEG, GIF, WebP,
/// BMP, TIFF, ICO, PNM, QOI, ...).
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)
}
