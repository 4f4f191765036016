// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection normalization
//!
//! Invokes the inference backend once per raster and maps its raw output to
//! the response contract. Order, confidences and coordinates pass through
//! untouched; only `id`, `class_name` and the box extent are added.

use std::sync::Arc;

use tracing::{debug, error};

use super::backend::InferenceBackend;
use super::error::DetectError;
use super::types::{BoundingBox, Detection, DetectionResponse, RawDetection};
use crate::vision::{ClassLabels, Raster};

/// Default minimum score retained by the backend
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

#[derive(Clone)]
pub struct DetectionNormalizer {
    backend: Arc<dyn InferenceBackend>,
    labels: Arc<ClassLabels>,
    confidence_threshold: f32,
}

impl std::fmt::Debug for DetectionNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionNormalizer")
            .field("classes", &self.labels.len())
            .field("confidence_threshold", &self.confidence_threshold)
            .finish_non_exhaustive()
    }
}

impl DetectionNormalizer {
    pub fn new(backend: Arc<dyn InferenceBackend>, labels: Arc<ClassLabels>) -> Self {
        Self {
            backend,
            labels,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    /// Run detection on a raster
    ///
    /// A backend failure yields no partial response.
    pub fn detect(&self, raster: &Raster) -> Result<DetectionResponse, DetectError> {
        let prediction = self.backend.predict(raster, self.confidence_threshold)?;
        let raw = prediction.detections.unwrap_or_default();

        let detections = raw
            .iter()
            .enumerate()
            .map(|(id, det)| self.normalize(id, det))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Normalized {} detections for {}x{} image",
            detections.len(),
            raster.width(),
            raster.height()
        );

        Ok(DetectionResponse {
            detections,
            image_width: raster.width(),
            image_height: raster.height(),
        })
    }

    fn normalize(&self, id: usize, raw: &RawDetection) -> Result<Detection, DetectError> {
        let class_name = self.labels.get(raw.class_id).ok_or_else(|| {
            error!(
                "Class {} has no label; label table covers {} classes",
                raw.class_id,
                self.labels.len()
            );
            DetectError::Configuration(format!("no label for class {}", raw.class_id))
        })?;

        Ok(Detection {
            id,
            class_id: raw.class_id,
            class_name: class_name.to_string(),
            confidence: raw.confidence,
            bbox: BoundingBox::from_corners(raw.x1, raw.y1, raw.x2, raw.y2),
        })
    }
}
