// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client the UI service uses to call the AI service

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::errors::ApiError;
use crate::vision::Detection;

/// Content type sent when the browser did not provide one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum AiClientError {
    /// Connection refused, DNS failure, timeout
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The AI service answered with something other than 200
    #[error("{body}")]
    Status { status: u16, body: String },

    /// 200 with a body that is not the expected JSON
    #[error("invalid response from AI service: {0}")]
    InvalidResponse(String),
}

impl From<AiClientError> for ApiError {
    fn from(err: AiClientError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// What the UI service needs from a /detect reply
///
/// Missing fields default the same way the page expects: no URL, no boxes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AiDetectReply {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Client for the AI service's detect endpoint
#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    detect_url: String,
}

impl AiClient {
    pub fn new(detect_url: &str, timeout: Duration) -> Result<Self, AiClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        info!("AI service client configured: endpoint={}", detect_url);

        Ok(Self {
            client,
            detect_url: detect_url.to_string(),
        })
    }

    pub fn detect_url(&self) -> &str {
        &self.detect_url
    }

    /// POST the image as multipart field `file`
    pub async fn detect(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<AiDetectReply, AiClientError> {
        // Unparseable content types from the browser fall back to the default
        let mime = content_type
            .filter(|ct| Part::bytes(Vec::new()).mime_str(ct).is_ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        debug!("AI service POST {} ({})", self.detect_url, filename);

        let response = self
            .client
            .post(&self.detect_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(AiClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AiClientError::InvalidResponse(e.to_string()))
    }
}
