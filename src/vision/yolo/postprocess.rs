// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-max suppression
//!
//! Exports emit `[1, 4 + nc, anchors]` (v8/v11) or `[1, anchors, 4 + nc]`.
//! Each anchor row is `cx, cy, w, h` in letterboxed input space followed by
//! one score per class.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView2, ArrayViewD, Ix2};

use super::preprocessing::LetterboxInfo;
use crate::detection::{InferenceError, RawDetection};

/// Cap on candidates entering NMS
pub const MAX_NMS_CANDIDATES: usize = 30_000;

/// Default IoU above which a lower-scoring box of the same class is dropped
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Default maximum detections returned per image
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

/// Normalise the raw output tensor to `[anchors, 4 + nc]`
///
/// With `expected_features` unknown, the smaller of the two trailing
/// dimensions is taken as the feature axis.
pub fn to_anchor_rows(
    output: ArrayViewD<f32>,
    expected_features: Option<usize>,
) -> Result<Array2<f32>, InferenceError> {
    let shape = output.shape().to_vec();
    let shape_error = |expected: &str| InferenceError::OutputShape {
        expected: expected.to_string(),
        got: format!("{:?}", shape),
    };

    if shape.len() != 3 || shape[0] != 1 {
        return Err(shape_error("[1, features, anchors] or [1, anchors, features]"));
    }

    let features_first = match expected_features {
        Some(features) if shape[1] == features => true,
        Some(features) if shape[2] == features => false,
        Some(features) => return Err(shape_error(&format!("a dimension of {}", features))),
        None => shape[1] <= shape[2],
    };

    let features = if features_first { shape[1] } else { shape[2] };
    if features < 5 {
        return Err(shape_error("at least 5 features per anchor"));
    }

    let matrix = output
        .index_axis(ndarray::Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .map_err(|e| InferenceError::Other(e.to_string()))?;

    Ok(if features_first {
        matrix.t().to_owned()
    } else {
        matrix.to_owned()
    })
}

/// Best-class candidates scoring above `confidence_threshold`, in original
/// image coordinates clipped to the image bounds
pub fn extract_candidates(
    rows: ArrayView2<f32>,
    confidence_threshold: f32,
    letterbox: &LetterboxInfo,
) -> Vec<RawDetection> {
    let max_x = letterbox.orig_width as f32;
    let max_y = letterbox.orig_height as f32;

    let mut candidates = Vec::new();
    for row in rows.outer_iter() {
        let scores = row.slice(ndarray::s![4..]);
        let Some((class_id, &score)) = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
        else {
            continue;
        };

        if !(score > confidence_threshold) {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);

        candidates.push(RawDetection::new(
            class_id as u32,
            score,
            [
                x1.clamp(0.0, max_x),
                y1.clamp(0.0, max_y),
                x2.clamp(0.0, max_x),
                y2.clamp(0.0, max_y),
            ],
        ));
    }

    candidates
}

pub fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    let union = area_a + area_b - intersection;

    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Per-class greedy NMS
///
/// Output is ordered by descending confidence and holds at most
/// `max_detections` boxes.
pub fn non_max_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(MAX_NMS_CANDIDATES);

    let mut kept: Vec<RawDetection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
