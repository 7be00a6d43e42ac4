// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload response types

use serde::{Deserialize, Serialize};

use crate::api::ai_client::AiDetectReply;
use crate::storage::url_basename;
use crate::vision::Detection;

/// Response from POST /upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    /// Name the upload was stored under
    pub input_image: String,
    /// Basename of `output_img_url`
    pub output_image: String,
    /// URL of the annotated image, as returned by the AI service
    pub output_img_url: String,
    pub detections: Vec<Detection>,
}

impl UploadResponse {
    pub fn from_reply(input_image: &str, reply: AiDetectReply) -> Self {
        Self {
            input_image: input_image.to_string(),
            output_image: url_basename(&reply.image_url),
            output_img_url: reply.image_url,
            detections: reply.detections,
        }
    }
}
