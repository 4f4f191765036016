// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detection;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState};
pub use config::DetectNodeConfig;
pub use detection::{
    BoundingBox, DetectError, Detection, DetectionNormalizer, DetectionResponse,
    InferenceBackend, InferenceError,
};
pub use vision::{ClassLabels, DetectorModelManager, Raster};
