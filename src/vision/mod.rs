// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for object detection
//!
//! This module provides:
//! - Image decoding into RGB rasters
//! - Class label tables
//! - YOLO detection via ONNX Runtime (CPU)

pub mod image_utils;
pub mod labels;
pub mod model_manager;
pub mod raster;
pub mod yolo;

pub use image_utils::{
    decode_base64_image, decode_image_bytes, detect_format, ImageError, DEFAULT_MAX_IMAGE_BYTES,
};
pub use labels::{ClassLabels, LabelError};
pub use model_manager::{DetectorModelConfig, DetectorModelInfo, DetectorModelManager};
pub use raster::Raster;
