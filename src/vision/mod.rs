// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the AI service
//!
//! This module provides:
//! - Upload decoding
//! - Object detection via YOLOv8 (ONNX, CPU)
//! - Annotated output images

pub mod annotate;
pub mod detection;
pub mod image_utils;
pub mod model_manager;
pub mod yolo;

pub use annotate::Annotator;
pub use detection::{Detection, Detector};
pub use image_utils::{
    decode_image_bytes, decode_image_bytes_with_limit, detect_format, ImageError, ImageInfo,
};
pub use model_manager::{ensure_model_file, VisionModelInfo, VisionModelManager};
pub use yolo::{YoloConfig, YoloDetector};
