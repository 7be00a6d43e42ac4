// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLOv8

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size for YOLOv8 exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Padding value used by ultralytics letterboxing
pub const PAD_VALUE: u8 = 114;

/// Scale and offsets applied by the letterbox
///
/// Needed to map model-space boxes back onto the original image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub original_width: u32,
    pub original_height: u32,
}

impl Letterbox {
    pub fn new(original_width: u32, original_height: u32, target_size: u32) -> Self {
        if original_width == 0 || original_height == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
                original_width,
                original_height,
            };
        }

        let scale = (target_size as f32 / original_width as f32)
            .min(target_size as f32 / original_height as f32);
        let (new_w, new_h) = Self::scaled_dims(original_width, original_height, scale);

        Self {
            scale,
            offset_x: ((target_size - new_w) / 2) as f32,
            offset_y: ((target_size - new_h) / 2) as f32,
            original_width,
            original_height,
        }
    }

    fn scaled_dims(width: u32, height: u32, scale: f32) -> (u32, u32) {
        let new_w = ((width as f32 * scale).round() as u32).max(1);
        let new_h = ((height as f32 * scale).round() as u32).max(1);
        (new_w, new_h)
    }

    /// Map a model-space point back to original pixel space, clamped to the image
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let ox = (x - self.offset_x) / self.scale;
        let oy = (y - self.offset_y) / self.scale;
        (
            ox.clamp(0.0, self.original_width as f32),
            oy.clamp(0.0, self.original_height as f32),
        )
    }
}

/// Letterbox an image into a `target_size` square and build the NCHW tensor
///
/// Steps:
/// 1. Resize preserving aspect ratio
/// 2. Center on a gray (114) canvas
/// 3. Scale RGB to [0, 1]
/// 4. Lay out as [1, 3, S, S]
pub fn preprocess(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let letterbox = Letterbox::new(orig_w, orig_h, target_size);

    let mut canvas = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([PAD_VALUE, PAD_VALUE, PAD_VALUE]),
    );

    if orig_w > 0 && orig_h > 0 {
        let (new_w, new_h) = Letterbox::scaled_dims(orig_w, orig_h, letterbox.scale);
        let resized = image
            .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
            .to_rgb8();
        imageops::replace(
            &mut canvas,
            &resized,
            letterbox.offset_x as i64,
            letterbox.offset_y as i64,
        );
    }

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}
