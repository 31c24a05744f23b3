// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, info, warn};

use super::request::DetectRequest;
use super::response::DetectResponse;
use crate::api::errors::DetectError;
use crate::api::http_server::AppState;
use crate::detection::{normalize_results, Detection};
use crate::vision::decode_data_uri;

/// POST /detect - Run object detection on a base64-encoded image
///
/// Accepts a data-URI image and returns detected objects with class
/// labels, confidences in [0,100], and integer corner bounding boxes.
///
/// # Request
/// - `image`: data-URI string (`data:image/jpeg;base64,...`) (required)
///
/// # Response
/// Always HTTP 200:
/// - `{success: true, detections: [...], count: N}` on success
/// - `{success: false, error: "..."}` on any pipeline failure
pub async fn detect_handler(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> Json<DetectResponse> {
    match run_pipeline(&state, &request) {
        Ok(detections) => {
            info!("Detection complete: {} objects", detections.len());
            Json(DetectResponse::ok(detections))
        }
        Err(e) => {
            warn!("Detection request failed: {}", e);
            Json(DetectResponse::failure(e))
        }
    }
}

/// decode -> detect -> normalize
fn run_pipeline(state: &AppState, request: &DetectRequest) -> Result<Vec<Detection>, DetectError> {
    let data_uri = request.validate()?;

    let (image, info) = decode_data_uri(data_uri)?;
    debug!(
        "Decoded image: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );

    let results = state.detector.detect(&image, state.conf_threshold)?;

    let detections = normalize_results(&results, &state.classes)?;
    Ok(detections)
}
