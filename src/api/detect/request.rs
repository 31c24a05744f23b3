// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request type and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::DetectError;

/// Request for object detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Data-URI image string: `<mime-prefix>,<base64 payload>`
    #[serde(default)]
    pub image: Option<String>,
}

impl DetectRequest {
    /// Validate the detection request
    pub fn validate(&self) -> Result<&str, DetectError> {
        match self.image.as_deref() {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(DetectError::Validation {
                field: "image".to_string(),
                message: "image is required".to_string(),
            }),
        }
    }
}
