// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint
//!
//! Accepts an image as a multipart upload or base64 JSON and returns the
//! objects found in it.

pub mod handler;
pub mod request;

pub use handler::detect_handler;
pub use request::{extract_image_payload, DetectRequest};
