// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use super::backend::InferenceError;
use crate::vision::{ImageError, LabelError};

/// Failure classes of the request-to-detection pipeline
#[derive(Debug, Error)]
pub enum DetectError {
    /// No usable image field in the request
    #[error("{0}")]
    InvalidInput(String),

    /// Image bytes present but not a parseable image
    #[error("Invalid image: {0}")]
    Decode(#[from] ImageError),

    #[error("{0}")]
    Inference(#[from] InferenceError),

    /// Model artifact or label table unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DetectError {
    pub fn no_image() -> Self {
        DetectError::InvalidInput("No image provided".to_string())
    }

    /// True for errors the caller can fix by resending
    pub fn is_client_error(&self) -> bool {
        matches!(self, DetectError::InvalidInput(_) | DetectError::Decode(_))
    }
}

impl From<LabelError> for DetectError {
    fn from(e: LabelError) -> Self {
        DetectError::Configuration(e.to_string())
    }
}
