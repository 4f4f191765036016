// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO detector on ONNX Runtime
//!
//! Components:
//! - `preprocessing` - Letterbox resize and NCHW tensor
//! - `postprocess` - Output decoding, confidence filter, NMS
//! - `model` - Session wrapper implementing `InferenceBackend`

pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use model::{YoloConfig, YoloOnnxModel};
pub use preprocessing::{LetterboxInfo, YOLO_INPUT_SIZE};
