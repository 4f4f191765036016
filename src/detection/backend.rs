// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference capability seam
//!
//! The normalizer only knows this trait. The production implementation is
//! [`crate::vision::yolo::YoloOnnxModel`]; tests use [`MockInferenceBackend`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use super::types::{RawDetection, RawPrediction};
use crate::vision::Raster;

/// Failure inside the inference backend
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference session error: {0}")]
    Session(String),

    #[error("Unexpected model output shape {got}, expected {expected}")]
    OutputShape { expected: String, got: String },

    #[error("Inference session lock poisoned")]
    LockPoisoned,

    #[error("Inference failed: {0}")]
    Other(String),
}

/// Maps a raster and a confidence threshold to raw detections
///
/// Implementations perform their own confidence filtering and non-max
/// suppression. They are shared across concurrent requests, so any internal
/// state that needs exclusive access must be synchronised by the implementation.
pub trait InferenceBackend: Send + Sync {
    fn predict(
        &self,
        raster: &Raster,
        confidence_threshold: f32,
    ) -> Result<RawPrediction, InferenceError>;
}

/// Scripted backend for tests and local development
///
/// Returns the configured outcome for every call and counts invocations.
#[derive(Debug)]
pub struct MockInferenceBackend {
    outcome: MockOutcome,
    calls: AtomicUsize,
    last_threshold: Mutex<Option<f32>>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Detections(Vec<RawDetection>),
    NoDetectionList,
    Fail(String),
}

impl MockInferenceBackend {
    pub fn with_detections(detections: Vec<RawDetection>) -> Self {
        Self::from_outcome(MockOutcome::Detections(detections))
    }

    pub fn empty() -> Self {
        Self::with_detections(Vec::new())
    }

    /// Result object without a detection list
    pub fn without_detection_list() -> Self {
        Self::from_outcome(MockOutcome::NoDetectionList)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_outcome(MockOutcome::Fail(message.into()))
    }

    fn from_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_threshold: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_threshold(&self) -> Option<f32> {
        self.last_threshold.lock().ok().and_then(|guard| *guard)
    }
}

impl InferenceBackend for MockInferenceBackend {
    fn predict(
        &self,
        _raster: &Raster,
        confidence_threshold: f32,
    ) -> Result<RawPrediction, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_threshold.lock() {
            *last = Some(confidence_threshold);
        }

        match &self.outcome {
            MockOutcome::Detections(detections) => Ok(RawPrediction::new(detections.clone())),
            MockOutcome::NoDetectionList => Ok(RawPrediction::without_detections()),
            MockOutcome::Fail(message) => Err(InferenceError::Other(message.clone())),
        }
    }
}
