// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding for inbound detection requests
//!
//! The frontend submits images as data URIs
//! (`data:image/jpeg;base64,<payload>`); this module turns those into
//! pixel buffers the detection engine can consume.

pub mod image_utils;

pub use image_utils::{decode_base64_image, decode_data_uri, detect_format, ImageError, ImageInfo};
