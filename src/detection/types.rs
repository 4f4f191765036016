// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection records: raw capability output and the externally visible contract

use serde::{Deserialize, Serialize};

/// Untransformed detection from the inference backend
///
/// Corners are absolute pixel coordinates of the raster that was submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    /// Class index in the model's class space
    pub class_id: u32,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl RawDetection {
    pub fn new(class_id: u32, confidence: f32, corners: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = corners;
        Self {
            class_id,
            confidence,
            x1,
            y1,
            x2,
            y2,
        }
    }
}

/// Result object of a single prediction
///
/// `detections` is `None` when the backend produced a result without a
/// detection list at all; the normalizer treats that the same as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPrediction {
    pub detections: Option<Vec<RawDetection>>,
}

impl RawPrediction {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections: Some(detections),
        }
    }

    /// Prediction result carrying no detection list
    pub fn without_detections() -> Self {
        Self { detections: None }
    }
}

/// Bounding box with derived extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build from corners, deriving width and height by subtraction
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

/// A detected object as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Zero-based position in the backend's result order
    pub id: usize,
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Response body of the detect endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub detections: Vec<Detection>,
    pub image_width: u32,
    pub image_height: u32,
}
