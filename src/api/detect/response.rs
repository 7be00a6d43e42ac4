// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect response types

use serde::{Deserialize, Serialize};

use crate::storage::{annotated_name, public_url};
use crate::vision::Detection;

/// Response from POST /detect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectResponse {
    pub detections: Vec<Detection>,
    /// URL of the annotated copy, e.g. `/uploads/boxed_cat.jpg`
    pub image_url: String,
}

impl DetectResponse {
    /// Build the response for an upload stored as `filename`
    pub fn new(detections: Vec<Detection>, filename: &str) -> Self {
        Self {
            detections,
            image_url: public_url(&annotated_name(filename)),
        }
    }
}

/// Response from GET /health
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl HealthResponse {
    pub fn ok(model: Option<&str>) -> Self {
        Self {
            status: "ok".to_string(),
            model: model.map(str::to_string),
        }
    }
}
