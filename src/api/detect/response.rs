// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::detection::Detection;

/// Response from POST /detect.
///
/// Success carries `detections` and `count`; failure carries `error`.
/// Both shapes go out with HTTP 200 for frontend compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectResponse {
    /// Build a success response; `count` always equals the detection count
    pub fn ok(detections: Vec<Detection>) -> Self {
        let count = detections.len();
        Self {
            success: true,
            detections: Some(detections),
            count: Some(count),
            error: None,
        }
    }

    /// Build a failure response carrying the stringified error
    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            detections: None,
            count: None,
            error: Some(error.to_string()),
        }
    }
}
