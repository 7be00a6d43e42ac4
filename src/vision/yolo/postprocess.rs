// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding and non-maximum suppression

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix2};

use super::preprocessing::Letterbox;
use crate::vision::detection::Detection;

/// Thresholds applied while decoding model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParams {
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }
}

/// Candidate box in original pixel space, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub class_id: usize,
    pub confidence: f32,
}

impl Candidate {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &Self) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// Decode a raw YOLOv8 output tensor into detections
///
/// The export layout is `[1, 4 + nc, anchors]`: rows 0-3 hold cx, cy, w, h
/// in letterboxed input space, the remaining rows hold per-class scores.
pub fn decode_output(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    labels: &[String],
    params: &DecodeParams,
) -> Result<Vec<Detection>> {
    let shape = output.shape().to_vec();
    let preds = match shape.len() {
        3 if shape[0] == 1 => output
            .index_axis_move(Axis(0), 0)
            .into_dimensionality::<Ix2>()?,
        2 => output.into_dimensionality::<Ix2>()?,
        _ => anyhow::bail!("Unexpected YOLO output shape: {:?}", shape),
    };

    let (rows, anchors) = preds.dim();
    if rows <= 4 {
        anyhow::bail!("YOLO output has no class rows: {:?}", shape);
    }
    let num_classes = rows - 4;

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let column = preds.column(i);
        let (class_id, confidence) = column
            .iter()
            .skip(4)
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));

        if confidence < params.conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);

        candidates.push(Candidate {
            x1,
            y1,
            x2,
            y2,
            class_id: class_id.min(num_classes - 1),
            confidence,
        });
    }

    let kept = non_max_suppression(candidates, params.iou_threshold, params.max_detections);

    Ok(kept
        .into_iter()
        .map(|c| {
            let label = labels
                .get(c.class_id)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", c.class_id));
            Detection::new(
                label,
                [c.x1 as i32, c.y1 as i32, c.x2 as i32, c.y2 as i32],
                c.confidence,
            )
        })
        .collect())
}

/// Greedy per-class NMS
///
/// Sorts by descending confidence and drops any box whose IoU with an
/// already kept box of the same class exceeds `iou_threshold`.
pub fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
