// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Startup must fail, not serve, when the model artifact is unusable

use std::io::Write;

use fabstir_detect_node::{
    config::DetectNodeConfig,
    detection::DetectError,
    vision::{DetectorModelConfig, DetectorModelManager},
};
use tempfile::NamedTempFile;

#[test]
fn test_missing_model_fails_startup() {
    let config = DetectNodeConfig {
        model_path: "/nonexistent/model/best.onnx".to_string(),
        ..Default::default()
    };

    let err = DetectorModelManager::new(config.model_config()).unwrap_err();
    assert!(matches!(err, DetectError::Configuration(_)));
    assert!(err.to_string().contains("Model file not found"));
}

#[test]
fn test_corrupt_model_fails_startup() {
    let mut model = NamedTempFile::new().unwrap();
    model.write_all(b"not an onnx graph").unwrap();
    let mut labels = NamedTempFile::new().unwrap();
    labels.write_all(b"person\n").unwrap();

    let config = DetectorModelConfig {
        model_path: model.path().display().to_string(),
        labels_path: labels.path().display().to_string(),
        ..Default::default()
    };

    let err = DetectorModelManager::new(config).unwrap_err();
    assert!(matches!(err, DetectError::Configuration(_)));
}
