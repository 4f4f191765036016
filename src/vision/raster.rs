// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoded RGB raster handed to the detection backend

use image::{DynamicImage, Rgb, RgbImage};

use super::image_utils::ImageError;

/// Decoded image with known dimensions, 8-bit RGB channel order
///
/// Width and height are always positive.
#[derive(Debug, Clone)]
pub struct Raster {
    pixels: RgbImage,
}

impl Raster {
    /// Normalize any colour model (grayscale, alpha, 16-bit) to RGB8
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, ImageError> {
        Self::from_rgb(image.into_rgb8())
    }

    pub fn from_rgb(pixels: RgbImage) -> Result<Self, ImageError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions { width, height });
        }
        Ok(Self { pixels })
    }

    /// Uniform raster, used for model warm-up
    pub fn filled(width: u32, height: u32, value: [u8; 3]) -> Result<Self, ImageError> {
        Self::from_rgb(RgbImage::from_pixel(width, height, Rgb(value)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }
}
