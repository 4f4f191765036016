// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::detection::DetectError;

/// Message returned in place of inference details when redaction is on
pub const REDACTED_INFERENCE_MESSAGE: &str = "inference failed";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    InvalidInput(String),
    DecodeError(String),
    InferenceError(String),
    InternalError(String),
}

impl ApiError {
    /// Classify a pipeline error
    ///
    /// With `redact` set, inference and configuration details are replaced by
    /// a generic message; client errors always keep theirs.
    pub fn from_detect_error(error: DetectError, redact: bool) -> Self {
        match error {
            DetectError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            err @ DetectError::Decode(_) => ApiError::DecodeError(err.to_string()),
            err @ DetectError::Inference(_) => ApiError::InferenceError(if redact {
                REDACTED_INFERENCE_MESSAGE.to_string()
            } else {
                err.to_string()
            }),
            err @ DetectError::Configuration(_) => ApiError::InternalError(if redact {
                REDACTED_INFERENCE_MESSAGE.to_string()
            } else {
                err.to_string()
            }),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidInput(msg)
            | ApiError::DecodeError(msg)
            | ApiError::InferenceError(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message().to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::DecodeError(_) => StatusCode::BAD_REQUEST,
            ApiError::InferenceError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DetectError> for ApiError {
    fn from(error: DetectError) -> Self {
        ApiError::from_detect_error(error, false)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ApiError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            ApiError::InferenceError(msg) => write!(f, "Inference error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
