// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration from environment variables

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Default confidence threshold used by the deployment
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.3;

/// Runtime configuration, read once at startup.
///
/// `MODEL_PATH` is required; the model artifact is an opaque external
/// resource and there is no sensible default location for it.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Path to the ONNX detection model artifact
    pub model_path: PathBuf,
    /// Listen address (API_HOST, default 0.0.0.0)
    pub host: String,
    /// Listen port (API_PORT, default 5000)
    pub port: u16,
    /// Confidence threshold for detections (CONF_THRESHOLD, default 0.3)
    pub conf_threshold: f32,
}

impl NodeConfig {
    pub fn from_env() -> Result<Self> {
        let model_path = env::var("MODEL_PATH")
            .context("MODEL_PATH must be set to the ONNX detection model file")?;

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let conf_threshold = env::var("CONF_THRESHOLD")
            .ok()
            .map(|v| v.parse::<f32>())
            .transpose()
            .context("CONF_THRESHOLD must be a number in [0,1]")?
            .unwrap_or(DEFAULT_CONF_THRESHOLD);

        if !(0.0..=1.0).contains(&conf_threshold) {
            anyhow::bail!(
                "CONF_THRESHOLD must be in [0,1], got {}",
                conf_threshold
            );
        }

        Ok(Self {
            model_path: PathBuf::from(model_path),
            host,
            port,
            conf_threshold,
        })
    }
}
