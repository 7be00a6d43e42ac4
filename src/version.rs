// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the detection relay services

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Features compiled into this build
pub const FEATURES: &[&str] = &[
    "yolov8-onnx",
    "letterbox-preprocess",
    "per-class-nms",
    "annotated-output",
    "multipart-relay",
    "shared-uploads",
];

/// Get formatted version string for logging
pub fn get_version_string(service: &str) -> String {
    format!("detect-relay {} {}", service, VERSION_NUMBER)
}
