// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model manager
//!
//! Loads the model artifact and its label table once at startup and hands out
//! read-only handles to request handlers.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::detection::{DetectError, DetectionNormalizer, InferenceBackend};
use crate::vision::labels::ClassLabels;
use crate::vision::yolo::{YoloConfig, YoloOnnxModel};

/// Configuration for loading the detection model
#[derive(Debug, Clone)]
pub struct DetectorModelConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the class label table
    pub labels_path: String,
    pub yolo: YoloConfig,
}

impl Default for DetectorModelConfig {
    fn default() -> Self {
        Self {
            model_path: "model/best.onnx".to_string(),
            labels_path: "model/labels.txt".to_string(),
            yolo: YoloConfig::default(),
        }
    }
}

/// Information about the loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorModelInfo {
    /// Model file stem (e.g. "best")
    pub name: String,
    pub model_path: String,
    pub num_classes: usize,
}

/// Owner of the process-wide detection model
pub struct DetectorModelManager {
    backend: Arc<dyn InferenceBackend>,
    labels: Arc<ClassLabels>,
    info: DetectorModelInfo,
}

impl std::fmt::Debug for DetectorModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorModelManager")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl DetectorModelManager {
    /// Load the model and verify the label table covers its class space
    ///
    /// Every failure is a configuration error: the node must not serve
    /// traffic without a usable model.
    pub fn new(config: DetectorModelConfig) -> Result<Self, DetectError> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            error!("Model file not found: {}", config.model_path);
            return Err(DetectError::Configuration(format!(
                "Model file not found: {}",
                config.model_path
            )));
        }

        let labels = ClassLabels::load(&config.labels_path)?;
        info!(
            "Loaded {} class labels from {}",
            labels.len(),
            config.labels_path
        );

        let model = YoloOnnxModel::load(model_path, config.yolo.clone())
            .map_err(|e| DetectError::Configuration(format!("{:#}", e)))?;

        let num_classes = model.warm_up().map_err(|e| {
            DetectError::Configuration(format!("Model warm-up failed: {}", e))
        })?;
        labels.ensure_covers(num_classes)?;

        let info = DetectorModelInfo {
            name: model_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "detector".to_string()),
            model_path: config.model_path.clone(),
            num_classes,
        };

        info!("✅ Detection model loaded: {} ({} classes)", info.name, num_classes);

        Ok(Self {
            backend: Arc::new(model),
            labels: Arc::new(labels),
            info,
        })
    }

    /// Wrap an already constructed backend
    pub fn from_backend(
        backend: Arc<dyn InferenceBackend>,
        labels: ClassLabels,
        name: impl Into<String>,
    ) -> Self {
        let info = DetectorModelInfo {
            name: name.into(),
            model_path: String::new(),
            num_classes: labels.len(),
        };
        Self {
            backend,
            labels: Arc::new(labels),
            info,
        }
    }

    pub fn backend(&self) -> Arc<dyn InferenceBackend> {
        self.backend.clone()
    }

    pub fn labels(&self) -> Arc<ClassLabels> {
        self.labels.clone()
    }

    pub fn info(&self) -> &DetectorModelInfo {
        &self.info
    }

    /// Normalizer bound to this model with the given confidence threshold
    pub fn normalizer(&self, confidence_threshold: f32) -> DetectionNormalizer {
        DetectionNormalizer::new(self.backend(), self.labels())
            .with_confidence_threshold(confidence_threshold)
    }
}
