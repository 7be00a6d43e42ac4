// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection result type and the detector seam used by the AI service

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// One predicted object instance
///
/// Serialized exactly as `{"label", "box": [x1, y1, x2, y2], "confidence"}`,
/// with box corners in the original image's pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (e.g. "person")
    pub label: String,
    /// Corner coordinates `[x1, y1, x2, y2]`
    #[serde(rename = "box")]
    pub bbox: [i32; 4],
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, bbox: [i32; 4], confidence: f32) -> Self {
        Self {
            label: label.into(),
            bbox,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn width(&self) -> i32 {
        (self.bbox[2] - self.bbox[0]).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bbox[3] - self.bbox[1]).max(0)
    }

    /// Caption drawn above the box on annotated images
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }
}

/// Anything that turns an image into detections
///
/// The AI service only holds an `Arc<dyn Detector>`, so the ONNX model can be
/// swapped for a stub in tests.
pub trait Detector: Send + Sync {
    /// Run detection on a decoded image
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;

    /// Name reported by the health endpoint
    fn model_name(&self) -> &str;
}
