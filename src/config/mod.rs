// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration from command-line flags and environment variables

use std::net::SocketAddr;

use clap::Parser;

use crate::detection::{DetectError, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::vision::yolo::postprocess::{DEFAULT_IOU_THRESHOLD, DEFAULT_MAX_DETECTIONS};
use crate::vision::yolo::{YoloConfig, YOLO_INPUT_SIZE};
use crate::vision::{DetectorModelConfig, DEFAULT_MAX_IMAGE_BYTES};

/// Fabstir Detect Node
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fabstir-detect-node")]
#[command(version)]
#[command(about = "HTTP object detection node", long_about = None)]
pub struct DetectNodeConfig {
    /// Path to the ONNX detection model
    #[arg(long, env = "MODEL_PATH", default_value = "model/best.onnx")]
    pub model_path: String,

    /// Path to the class label table (JSON array/object or one name per line)
    #[arg(long, env = "LABELS_PATH", default_value = "model/labels.txt")]
    pub labels_path: String,

    /// Interface to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Route of the detection endpoint
    #[arg(long, env = "DETECT_PATH", default_value = "/detect")]
    pub detect_path: String,

    /// Minimum score for a detection to be returned
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    pub confidence_threshold: f32,

    /// IoU threshold for non-max suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = DEFAULT_IOU_THRESHOLD)]
    pub iou_threshold: f32,

    /// Square model input size in pixels
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = YOLO_INPUT_SIZE)]
    pub input_size: u32,

    /// Maximum detections per image
    #[arg(long, env = "MAX_DETECTIONS", default_value_t = DEFAULT_MAX_DETECTIONS)]
    pub max_detections: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Maximum decoded image size in bytes
    #[arg(long, env = "MAX_IMAGE_BYTES", default_value_t = DEFAULT_MAX_IMAGE_BYTES)]
    pub max_image_bytes: usize,

    /// Replace inference error details in 500 responses with a generic message
    #[arg(long, env = "REDACT_ERRORS")]
    pub redact_errors: bool,
}

impl Default for DetectNodeConfig {
    fn default() -> Self {
        Self {
            model_path: "model/best.onnx".to_string(),
            labels_path: "model/labels.txt".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            detect_path: "/detect".to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            input_size: YOLO_INPUT_SIZE,
            max_detections: DEFAULT_MAX_DETECTIONS,
            intra_threads: 4,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            redact_errors: false,
        }
    }
}

impl DetectNodeConfig {
    pub fn validate(&self) -> Result<(), DetectError> {
        let invalid = |msg: String| Err(DetectError::Configuration(msg));

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return invalid(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return invalid(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            ));
        }
        if !self.detect_path.starts_with('/') || self.detect_path == "/health" {
            return invalid(format!(
                "detect_path must start with '/' and differ from /health, got '{}'",
                self.detect_path
            ));
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return invalid(format!(
                "input_size must be a positive multiple of 32, got {}",
                self.input_size
            ));
        }
        if self.intra_threads == 0 || self.max_detections == 0 || self.max_image_bytes == 0 {
            return invalid(
                "intra_threads, max_detections and max_image_bytes must be positive".to_string(),
            );
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, DetectError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| DetectError::Configuration(format!("invalid listen address: {}", e)))
    }

    pub fn model_config(&self) -> DetectorModelConfig {
        DetectorModelConfig {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            yolo: YoloConfig {
                input_size: self.input_size,
                iou_threshold: self.iou_threshold,
                max_detections: self.max_detections,
                intra_threads: self.intra_threads,
            },
        }
    }

    /// Request body limit: base64 inflates payloads by 4/3, plus JSON/multipart framing
    pub fn body_limit(&self) -> usize {
        self.max_image_bytes
            .saturating_mul(4)
            .saturating_div(3)
            .saturating_add(64 * 1024)
    }
}
