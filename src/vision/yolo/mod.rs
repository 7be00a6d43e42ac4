// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection
//!
//! - Letterbox preprocessing
//! - ONNX Runtime inference (CPU)
//! - Output decoding with per-class NMS

pub mod labels;
pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use labels::{coco_labels, parse_names_metadata, COCO_CLASSES};
pub use model::{YoloConfig, YoloDetector};
pub use postprocess::{decode_output, non_max_suppression, Candidate, DecodeParams};
pub use preprocessing::{preprocess, Letterbox, YOLO_INPUT_SIZE};
