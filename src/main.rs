// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use stationscan_node::{
    api::start_server,
    config::NodeConfig,
    detection::OnnxDetector,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting stationscan node...\n");

    let config = NodeConfig::from_env()?;
    tracing::info!(
        "Configuration: model={}, listen={}:{}, conf_threshold={}",
        config.model_path.display(),
        config.host,
        config.port,
        config.conf_threshold
    );

    // Load the detection model once; requests share the instance
    println!("🧠 Loading detection model...");
    let detector = OnnxDetector::load(&config.model_path)?;
    println!("✅ Detection model loaded");

    let detector: Arc<dyn stationscan_node::detection::ObjectDetector> = Arc::new(detector);

    start_server(&config, detector)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
