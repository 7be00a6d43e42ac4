// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Draw detections onto a copy of the uploaded image

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::vision::detection::Detection;

/// Box and caption color (blue)
pub const BOX_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Outline thickness in pixels
pub const BOX_THICKNESS: i32 = 2;

/// Caption height in pixels
pub const CAPTION_SCALE: f32 = 18.0;

/// Vertical gap between caption and box
pub const CAPTION_OFFSET: i32 = 10;

/// Fonts tried when no font path is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws boxes and, when a font is available, captions
pub struct Annotator {
    font: Option<FontVec>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Annotator {
    /// Boxes only
    pub fn without_font() -> Self {
        Self { font: None }
    }

    /// Load the configured font, or the first system font found
    ///
    /// A missing or unreadable font is not fatal; captions are skipped.
    pub fn new(font_path: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match font_path {
            Some(path) => vec![path.to_path_buf()],
            None => SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match std::fs::read(&path)
                .ok()
                .and_then(|bytes| FontVec::try_from_vec(bytes).ok())
            {
                Some(font) => {
                    debug!("Using caption font {}", path.display());
                    return Self { font: Some(font) };
                }
                None => warn!("Could not load font {}", path.display()),
            }
        }

        warn!("No caption font available, annotated images will have boxes only");
        Self::without_font()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Return an annotated copy of `image`
    pub fn annotate(&self, image: &DynamicImage, detections: &[Detection]) -> DynamicImage {
        let mut canvas: RgbaImage = image.to_rgba8();
        if canvas.width() == 0 || canvas.height() == 0 {
            return DynamicImage::ImageRgba8(canvas);
        }

        for detection in detections {
            let [x1, y1, _, _] = detection.bbox;
            let width = detection.width().max(1) as u32;
            let height = detection.height().max(1) as u32;

            for inset in 0..BOX_THICKNESS {
                let w = width.saturating_sub(2 * inset as u32).max(1);
                let h = height.saturating_sub(2 * inset as u32).max(1);
                let rect = Rect::at(x1 + inset, y1 + inset).of_size(w, h);
                draw_hollow_rect_mut(&mut canvas, rect, BOX_COLOR);
            }

            if let Some(font) = &self.font {
                draw_text_mut(
                    &mut canvas,
                    BOX_COLOR,
                    x1,
                    y1 - CAPTION_OFFSET - CAPTION_SCALE as i32 / 2,
                    PxScale::from(CAPTION_SCALE),
                    font,
                    &detection.caption(),
                );
            }
        }

        DynamicImage::ImageRgba8(canvas)
    }
}
