// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use fabstir_detect_node::{
    api::{start_server, AppState},
    config::DetectNodeConfig,
    version,
    vision::DetectorModelManager,
};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 {}", version::get_build_summary());

    let config = DetectNodeConfig::parse();
    config.validate().context("Invalid configuration")?;

    info!("🧠 Loading detection model from {}", config.model_path);
    let manager = DetectorModelManager::new(config.model_config())
        .context("Failed to load detection model")?;

    info!(
        "Model {} ready: {} classes, confidence threshold {}",
        manager.info().name,
        manager.info().num_classes,
        config.confidence_threshold
    );

    let state = AppState::new(&manager, &config);
    start_server(&config, state).await
}
