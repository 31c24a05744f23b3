// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flattening of raw detection output into wire-format records

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classes::ClassNameTable;
use super::engine::ImageResult;

/// Errors from normalization
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Box has non-finite coordinate or confidence data")]
    NonFinite,
}

/// One detection as reported to the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Human-readable class label
    #[serde(rename = "class")]
    pub class_name: String,
    /// Confidence in [0,100], rounded to one decimal place
    pub confidence: f64,
    /// `[x1, y1, x2, y2]` corner coordinates, truncated to integers
    pub bbox: [i64; 4],
}

/// Flatten per-image results into a uniform detection list.
///
/// For every result that holds boxes, and for every box within it:
/// corner coordinates are truncated (toward zero, not rounded) to
/// integers, confidence is scaled to [0,100] and rounded to one decimal,
/// and the class id is resolved through `classes` with an "Unknown"
/// fallback. Output order matches the order the capability yielded.
pub fn normalize_results(
    results: &[ImageResult],
    classes: &ClassNameTable,
) -> Result<Vec<Detection>, NormalizeError> {
    let mut detections = Vec::new();

    for result in results {
        let Some(boxes) = &result.boxes else {
            continue;
        };
        for b in boxes {
            if ![b.x1, b.y1, b.x2, b.y2, b.confidence]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(NormalizeError::NonFinite);
            }

            detections.push(Detection {
                class_name: classes.name(b.class_id).to_string(),
                confidence: round_one_decimal(b.confidence as f64 * 100.0),
                bbox: [b.x1 as i64, b.y1 as i64, b.x2 as i64, b.y2 as i64],
            });
        }
    }

    Ok(detections)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
