// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detector on ONNX Runtime
//!
//! Runs Ultralytics-style exports (`yolo export format=onnx`) on CPU.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info};

use super::postprocess::{
    extract_candidates, non_max_suppression, to_anchor_rows, DEFAULT_IOU_THRESHOLD,
    DEFAULT_MAX_DETECTIONS,
};
use super::preprocessing::{preprocess, PAD_VALUE, YOLO_INPUT_SIZE};
use crate::detection::{InferenceBackend, InferenceError, RawPrediction};
use crate::vision::Raster;

/// Session and postprocessing settings
#[derive(Debug, Clone, PartialEq)]
pub struct YoloConfig {
    /// Square model input size
    pub input_size: u32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            input_size: YOLO_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
            intra_threads: 4,
        }
    }
}

/// YOLO detector backed by an ONNX Runtime session
///
/// `Session::run` needs exclusive access, so concurrent predictions are
/// serialised on the session mutex.
#[derive(Clone)]
pub struct YoloOnnxModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    config: YoloConfig,
    /// `4 + nc`, learned on the first inference
    output_features: Arc<OnceLock<usize>>,
}

impl std::fmt::Debug for YoloOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxModel")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .field("output_features", &self.output_features.get())
            .finish_non_exhaustive()
    }
}

impl YoloOnnxModel {
    /// Load a YOLO detector from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn load<P: AsRef<Path>>(model_path: P, config: YoloConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("Detection model input: {}", input_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
            output_features: Arc::new(OnceLock::new()),
        })
    }

    pub fn config(&self) -> &YoloConfig {
        &self.config
    }

    /// Run one blank frame through the model and return its class count
    pub fn warm_up(&self) -> Result<usize, InferenceError> {
        let size = self.config.input_size;
        let blank = Raster::filled(size, size, [PAD_VALUE; 3])
            .map_err(|e| InferenceError::Other(e.to_string()))?;
        let (input, _) = preprocess(&blank, size);

        let output = self.run_session(input)?;
        let rows = to_anchor_rows(output.view(), self.output_features.get().copied())?;
        let features = rows.ncols();
        let _ = self.output_features.set(features);

        info!(
            "Detection model warm-up complete: {} classes, {} anchors",
            features - 4,
            rows.nrows()
        );

        Ok(features - 4)
    }

    fn run_session(&self, input: Array4<f32>) -> Result<ArrayD<f32>, InferenceError> {
        let input_value =
            Value::from_array(input).map_err(|e| InferenceError::Session(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::LockPoisoned)?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| InferenceError::Session(e.to_string()))?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| InferenceError::Session(e.to_string()))?
            .to_owned();

        Ok(output)
    }
}

impl InferenceBackend for YoloOnnxModel {
    fn predict(
        &self,
        raster: &Raster,
        confidence_threshold: f32,
    ) -> Result<RawPrediction, InferenceError> {
        let (input, letterbox) = preprocess(raster, self.config.input_size);

        let output = self.run_session(input)?;
        let rows = to_anchor_rows(output.view(), self.output_features.get().copied())?;
        let _ = self.output_features.set(rows.ncols());

        let candidates = extract_candidates(rows.view(), confidence_threshold, &letterbox);
        let candidate_count = candidates.len();
        let detections = non_max_suppression(
            candidates,
            self.config.iou_threshold,
            self.config.max_detections,
        );

        debug!(
            "YOLO postprocess: {} candidates, {} after NMS",
            candidate_count,
            detections.len()
        );

        Ok(RawPrediction::new(detections))
    }
}
