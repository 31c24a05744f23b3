// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /detect
//!
//! These tests verify the observable contract of the detection endpoint:
//! - success responses carry detections and a matching count
//! - every pipeline failure comes back as {success: false, error} with
//!   HTTP 200
//! - normalization (truncation, confidence scaling, class labels) is
//!   visible through the wire format

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use image::DynamicImage;
use serde_json::{json, Value};
use stationscan_node::{
    api::http_server::{build_router, AppState},
    detection::{ClassNameTable, EngineError, ImageResult, ObjectDetector, RawBox},
};
use std::sync::Arc;
use tower::ServiceExt;

// 1x1 red PNG - minimal valid image
const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

/// Scripted detector yielding a fixed result set
struct FixedDetector {
    results: Vec<ImageResult>,
}

impl ObjectDetector for FixedDetector {
    fn detect(
        &self,
        _image: &DynamicImage,
        _conf_threshold: f32,
    ) -> Result<Vec<ImageResult>, EngineError> {
        Ok(self.results.clone())
    }
}

/// Detector that always fails, for capability-error tests
struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn detect(
        &self,
        _image: &DynamicImage,
        _conf_threshold: f32,
    ) -> Result<Vec<ImageResult>, EngineError> {
        Err(EngineError::OutputShape("engine exploded".to_string()))
    }
}

fn raw_box(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: u32) -> RawBox {
    RawBox {
        x1,
        y1,
        x2,
        y2,
        confidence,
        class_id,
    }
}

fn test_state(detector: Arc<dyn ObjectDetector>) -> AppState {
    AppState {
        detector,
        classes: Arc::new(ClassNameTable::station_safety()),
        conf_threshold: 0.3,
    }
}

fn data_uri() -> String {
    format!("data:image/png;base64,{}", TINY_PNG_BASE64)
}

async fn post_detect(state: AppState, body: Value) -> (StatusCode, Value) {
    let app = build_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/detect")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn test_detect_success_count_matches() {
    let state = test_state(Arc::new(FixedDetector {
        results: vec![ImageResult {
            boxes: Some(vec![
                raw_box(10.0, 10.0, 50.0, 50.0, 0.9, 0),
                raw_box(60.0, 60.0, 90.0, 90.0, 0.4, 2),
            ]),
        }],
    }));

    let (status, body) = post_detect(state, json!({ "image": data_uri() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["detections"].as_array().unwrap().len(), 2);
    assert_eq!(body["detections"][0]["class"], "FireExtinguisher");
    assert_eq!(body["detections"][1]["class"], "OxygenTank");
}

#[tokio::test]
async fn test_detect_normalization_visible_on_wire() {
    let state = test_state(Arc::new(FixedDetector {
        results: vec![ImageResult {
            boxes: Some(vec![raw_box(10.7, 20.2, 30.9, 40.1, 0.8567, 1)]),
        }],
    }));

    let (_status, body) = post_detect(state, json!({ "image": data_uri() })).await;

    let detection = &body["detections"][0];
    assert_eq!(detection["class"], "ToolBox");
    assert_eq!(detection["confidence"], 85.7);
    assert_eq!(detection["bbox"], json!([10, 20, 30, 40]));
}

#[tokio::test]
async fn test_detect_unknown_class_label() {
    let state = test_state(Arc::new(FixedDetector {
        results: vec![ImageResult {
            boxes: Some(vec![raw_box(0.0, 0.0, 5.0, 5.0, 0.5, 99)]),
        }],
    }));

    let (_status, body) = post_detect(state, json!({ "image": data_uri() })).await;
    assert_eq!(body["detections"][0]["class"], "Unknown");
}

#[tokio::test]
async fn test_detect_empty_results() {
    let state = test_state(Arc::new(FixedDetector {
        results: vec![ImageResult { boxes: None }],
    }));

    let (status, body) = post_detect(state, json!({ "image": data_uri() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_detect_missing_image_field() {
    let state = test_state(Arc::new(FixedDetector { results: vec![] }));

    let (status, body) = post_detect(state, json!({})).await;

    // Failure path still returns HTTP 200 for frontend compatibility
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_detect_no_comma_in_data_uri() {
    let state = test_state(Arc::new(FixedDetector { results: vec![] }));

    let (status, body) = post_detect(state, json!({ "image": TINY_PNG_BASE64 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("comma"));
}

#[tokio::test]
async fn test_detect_invalid_base64() {
    let state = test_state(Arc::new(FixedDetector { results: vec![] }));

    let (status, body) =
        post_detect(state, json!({ "image": "data:image/png;base64,@@@not-base64@@@" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_detect_non_image_bytes() {
    let state = test_state(Arc::new(FixedDetector { results: vec![] }));

    // "aGVsbG8gd29ybGQ=" is "hello world", valid base64 but not an image
    let (status, body) =
        post_detect(state, json!({ "image": "data:image/png;base64,aGVsbG8gd29ybGQ=" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_detect_capability_failure() {
    let state = test_state(Arc::new(FailingDetector));

    let (status, body) = post_detect(state, json!({ "image": data_uri() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("engine exploded"));
}

#[tokio::test]
async fn test_detect_idempotent_for_deterministic_capability() {
    let results = vec![ImageResult {
        boxes: Some(vec![raw_box(1.0, 2.0, 3.0, 4.0, 0.77, 0)]),
    }];

    let (_s1, body1) = post_detect(
        test_state(Arc::new(FixedDetector {
            results: results.clone(),
        })),
        json!({ "image": data_uri() }),
    )
    .await;
    let (_s2, body2) = post_detect(
        test_state(Arc::new(FixedDetector { results })),
        json!({ "image": data_uri() }),
    )
    .await;

    assert_eq!(body1["detections"], body2["detections"]);
}
