// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLO detectors

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;

use crate::vision::Raster;

/// Default square input size of YOLO exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Scale and offsets applied by [`letterbox`]
///
/// Maps model-space coordinates back to the original raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl LetterboxInfo {
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Resize keeping aspect ratio, then centre on a `target_size` square canvas
pub fn letterbox(raster: &Raster, target_size: u32) -> (RgbImage, LetterboxInfo) {
    let (orig_w, orig_h) = (raster.width(), raster.height());

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);

    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    if (new_w, new_h) == (orig_w, orig_h) {
        imageops::replace(&mut canvas, raster.as_rgb(), offset_x as i64, offset_y as i64);
    } else {
        let resized = imageops::resize(raster.as_rgb(), new_w, new_h, FilterType::Triangle);
        imageops::replace(&mut canvas, &resized, offset_x as i64, offset_y as i64);
    }

    let info = LetterboxInfo {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };

    (canvas, info)
}

/// Letterbox and convert to a `[1, 3, S, S]` tensor scaled to 0..1
pub fn preprocess(raster: &Raster, target_size: u32) -> (Array4<f32>, LetterboxInfo) {
    let (canvas, info) = letterbox(raster, target_size);
    let size = target_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}
