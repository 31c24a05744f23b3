// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pipeline error taxonomy
//!
//! Every failure in decode/detect/normalize is typed here, then collapsed
//! at the handler boundary into a flat `{success: false, error}` payload.

use thiserror::Error;

use crate::detection::{EngineError, NormalizeError};
use crate::vision::ImageError;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Image decode failed: {0}")]
    Decode(#[from] ImageError),

    #[error("Detection failed: {0}")]
    Capability(#[from] EngineError),

    #[error("Normalization failed: {0}")]
    Normalization(#[from] NormalizeError),

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },
}
