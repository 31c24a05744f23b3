// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detection;
pub mod vision;

// Re-export main types
pub use api::{detect_handler, AppState, DetectError, DetectRequest, DetectResponse};
pub use config::NodeConfig;
pub use detection::{
    ClassNameTable, Detection, EngineError, ImageResult, ObjectDetector, OnnxDetector, RawBox,
};
pub use vision::{decode_data_uri, ImageError};
