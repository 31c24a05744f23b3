// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection pipeline
//!
//! This module provides:
//! - The `ObjectDetector` seam the request handler depends on
//! - An ONNX Runtime backed implementation for YOLO-family exports
//! - Normalization of raw model output into wire-format detections

pub mod classes;
pub mod engine;
pub mod normalize;

pub use classes::ClassNameTable;
pub use engine::{EngineError, ImageResult, ObjectDetector, OnnxDetector, RawBox};
pub use normalize::{normalize_results, Detection, NormalizeError};
