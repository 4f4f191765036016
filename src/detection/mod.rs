// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request-to-detection pipeline
//!
//! - `ingestor` - payload (multipart bytes or base64) to raster
//! - `backend` - inference capability trait
//! - `normalizer` - raw backend output to the response contract

pub mod backend;
pub mod error;
pub mod ingestor;
pub mod normalizer;
pub mod types;

pub use backend::{InferenceBackend, InferenceError, MockInferenceBackend};
pub use error::DetectError;
pub use ingestor::{ingest, ImagePayload, UPLOAD_FIELD};
pub use normalizer::{DetectionNormalizer, DEFAULT_CONFIDENCE_THRESHOLD};
pub use types::{BoundingBox, Detection, DetectionResponse, RawDetection, RawPrediction};
