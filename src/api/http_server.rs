// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server wiring: router, shared state, health endpoint

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use crate::config::NodeConfig;
use crate::detection::{ClassNameTable, ObjectDetector};

use super::detect::detect_handler;

/// Shared per-request state: the loaded detection capability, the class
/// table, and the deployment confidence threshold. All read-only.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn ObjectDetector>,
    pub classes: Arc<ClassNameTable>,
    pub conf_threshold: f32,
}

impl AppState {
    pub fn new(detector: Arc<dyn ObjectDetector>, conf_threshold: f32) -> Self {
        Self {
            detector,
            classes: Arc::new(ClassNameTable::station_safety()),
            conf_threshold,
        }
    }
}

/// Response for GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Detection endpoint
        .route("/detect", post(detect_handler))
        // Health check
        .route("/health", get(health_handler))
        // The detector frontend is served from another origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    config: &NodeConfig,
    detector: Arc<dyn ObjectDetector>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(detector, config.conf_threshold);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Detection API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health - liveness probe for the frontend.
///
/// Reports `model_loaded: true` unconditionally; the process refuses to
/// start when the model cannot be loaded, so a reachable server implies a
/// loaded model.
pub async fn health_handler(State(_state): State<AppState>) -> impl IntoResponse {
    axum::response::Json(HealthResponse {
        status: "OK".to_string(),
        model_loaded: true,
    })
}
