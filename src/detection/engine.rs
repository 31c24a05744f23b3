// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection engine seam and ONNX Runtime implementation
//!
//! The request handler only sees the [`ObjectDetector`] trait: pixels and a
//! confidence threshold in, per-image results out. [`OnnxDetector`] is the
//! production implementation, wrapping an ONNX Runtime session over a
//! YOLO-family export (output layout `[1, 4 + num_classes, anchors]`).

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array4, ArrayView2, Axis};
use ort::execution_providers::CPU;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// Model input edge length. YOLO exports are square; 640 is the
/// standard export size.
const INPUT_SIZE: u32 = 640;

/// IoU threshold for non-maximum suppression
const IOU_THRESHOLD: f32 = 0.45;

/// Errors from the detection engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Unexpected model output shape: {0}")]
    OutputShape(String),
}

/// One raw box as yielded by the capability: corner coordinates in
/// source-image pixels, confidence in [0,1], integer class id.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: u32,
}

/// Per-image result; `boxes` is `None` when the model found nothing
#[derive(Debug, Clone, Default)]
pub struct ImageResult {
    pub boxes: Option<Vec<RawBox>>,
}

/// The detection capability the request handler depends on.
///
/// Implementations must suppress any box whose confidence is strictly
/// below `conf_threshold`. Thread safety is the implementation's
/// responsibility; callers share a single instance across requests.
pub trait ObjectDetector: Send + Sync {
    fn detect(
        &self,
        image: &DynamicImage,
        conf_threshold: f32,
    ) -> Result<Vec<ImageResult>, EngineError>;
}

/// ONNX Runtime backed object detector
///
/// The session is loaded once at startup and shared behind a mutex;
/// `Session::run` needs exclusive access.
pub struct OnnxDetector {
    session: Mutex<Session>,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxDetector")
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl OnnxDetector {
    /// Load a YOLO-family ONNX export from disk
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, EngineError> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(EngineError::ModelNotFound(model_path.to_path_buf()));
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()?
            .with_execution_providers([CPU::default().build()])
            .map_err(ort::Error::from)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::from)?
            .with_intra_threads(4)
            .map_err(ort::Error::from)?
            .commit_from_file(model_path)?;

        info!("Detection model loaded");

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
        })
    }

    /// Resize to the model input square and lay pixels out NCHW, [0,1]
    fn preprocess(image: &DynamicImage) -> Array4<f32> {
        let rgb = image.to_rgb8();
        let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        let size = INPUT_SIZE as usize;
        let mut input = Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }
        input
    }
}

impl ObjectDetector for OnnxDetector {
    fn detect(
        &self,
        image: &DynamicImage,
        conf_threshold: f32,
    ) -> Result<Vec<ImageResult>, EngineError> {
        let (orig_w, orig_h) = (image.width() as f32, image.height() as f32);
        let input = Self::preprocess(image);

        // Session::run needs &mut, lock for the duration of inference
        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            "images" => Value::from_array(input)?
        ])?;

        let preds = outputs[0].try_extract_array::<f32>()?;
        let preds = preds
            .into_dimensionality::<ndarray::Ix3>()
            .map_err(|e| EngineError::OutputShape(e.to_string()))?;

        // [1, attrs, anchors] -> [attrs, anchors]
        let preds = preds.index_axis(Axis(0), 0);

        let scale_x = orig_w / INPUT_SIZE as f32;
        let scale_y = orig_h / INPUT_SIZE as f32;

        let candidates = decode_predictions(preds, conf_threshold, scale_x, scale_y)?;
        let boxes = non_max_suppression(candidates, IOU_THRESHOLD);

        debug!("Detection produced {} boxes", boxes.len());

        let result = if boxes.is_empty() {
            ImageResult { boxes: None }
        } else {
            ImageResult { boxes: Some(boxes) }
        };
        Ok(vec![result])
    }
}

/// Decode a `[4 + num_classes, anchors]` prediction grid.
///
/// Each anchor column is `cx, cy, w, h` followed by one score per class.
/// The best-scoring class wins; anchors below `conf_threshold` are
/// suppressed. Coordinates are converted from center form in model input
/// space to corner form in source-image pixels.
pub fn decode_predictions(
    preds: ArrayView2<f32>,
    conf_threshold: f32,
    scale_x: f32,
    scale_y: f32,
) -> Result<Vec<RawBox>, EngineError> {
    let attrs = preds.shape()[0];
    let anchors = preds.shape()[1];

    if attrs < 5 {
        return Err(EngineError::OutputShape(format!(
            "expected at least 5 rows (4 coords + classes), got {}",
            attrs
        )));
    }

    let mut boxes = Vec::new();
    for a in 0..anchors {
        // Best class for this anchor
        let mut class_id = 0u32;
        let mut confidence = 0.0f32;
        for c in 4..attrs {
            let score = preds[[c, a]];
            if score > confidence {
                confidence = score;
                class_id = (c - 4) as u32;
            }
        }

        if confidence < conf_threshold {
            continue;
        }

        let cx = preds[[0, a]];
        let cy = preds[[1, a]];
        let w = preds[[2, a]];
        let h = preds[[3, a]];

        boxes.push(RawBox {
            x1: (cx - w / 2.0) * scale_x,
            y1: (cy - h / 2.0) * scale_y,
            x2: (cx + w / 2.0) * scale_x,
            y2: (cy + h / 2.0) * scale_y,
            confidence,
            class_id,
        });
    }

    Ok(boxes)
}

/// Intersection over union of two boxes
pub fn iou(a: &RawBox, b: &RawBox) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let iw = (ix2 - ix1).max(0.0);
    let ih = (iy2 - iy1).max(0.0);
    let inter = iw * ih;

    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;

    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Greedy class-aware non-maximum suppression.
///
/// Boxes are kept in descending confidence order; a box is dropped when
/// it overlaps a kept box of the same class above `iou_threshold`.
pub fn non_max_suppression(mut boxes: Vec<RawBox>, iou_threshold: f32) -> Vec<RawBox> {
    boxes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<RawBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
