// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::detect::detect_handler;
use super::handlers::health_handler;
use crate::config::DetectNodeConfig;
use crate::detection::DetectionNormalizer;
use crate::vision::DetectorModelManager;

/// Shared request state
///
/// Read-only after startup; cloning shares the underlying model.
#[derive(Clone)]
pub struct AppState {
    pub normalizer: DetectionNormalizer,
    pub detect_path: String,
    pub max_image_bytes: usize,
    pub body_limit: usize,
    pub redact_errors: bool,
}

impl AppState {
    pub fn new(manager: &DetectorModelManager, config: &DetectNodeConfig) -> Self {
        Self::with_normalizer(manager.normalizer(config.confidence_threshold), config)
    }

    pub fn with_normalizer(normalizer: DetectionNormalizer, config: &DetectNodeConfig) -> Self {
        Self {
            normalizer,
            detect_path: config.detect_path.clone(),
            max_image_bytes: config.max_image_bytes,
            body_limit: config.body_limit(),
            redact_errors: config.redact_errors,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let detect_path = state.detect_path.clone();
    let body_limit = state.body_limit;

    Router::new()
        .route("/health", get(health_handler))
        .route(&detect_path, post(detect_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl+C
pub async fn start_server(config: &DetectNodeConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "API server listening on {} (POST {})",
        listener.local_addr()?,
        state.detect_path
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
