// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// GET /health - Liveness probe
///
/// Always `{"status": "ok"}`; the node does not start without a model.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
