// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir Detect Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-yolo-detection-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "yolo-onnx",
    "multipart-upload",
    "base64-json",
    "letterbox-preprocessing",
    "per-class-nms",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Detect Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get build and feature summary for the startup log
pub fn get_build_summary() -> String {
    format!("build {} [{}]", VERSION, FEATURES.join(", "))
}
