// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command line / environment configuration for both services

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::yolo::{DecodeParams, YoloConfig};

pub const DEFAULT_UPLOAD_FOLDER: &str = "../shared/uploads";
pub const DEFAULT_AI_SERVICE_URL: &str = "http://127.0.0.1:8000/detect";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between 0 and 1, got {value}")]
    ThresholdOutOfRange { field: &'static str, value: f32 },

    #[error("input size must be a positive multiple of 32, got {0}")]
    InvalidInputSize(u32),

    #[error("max_detections must be at least 1")]
    NoDetectionsAllowed,

    #[error("invalid AI service URL '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },

    #[error("invalid listen address {0}")]
    InvalidListenAddr(String),
}

fn parse_listen_addr(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    format!("{}:{}", host, port)
        .parse()
        .map_err(|_| ConfigError::InvalidListenAddr(format!("{}:{}", host, port)))
}

fn check_threshold(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { field, value })
    }
}

/// AI service: runs the detector behind POST /detect
#[derive(Parser, Debug, Clone)]
#[command(name = "ai-service")]
#[command(about = "Object detection service: POST /detect with a multipart `file`", long_about = None)]
pub struct AiServiceConfig {
    #[arg(long, env = "AI_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "AI_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Folder shared with the UI service
    #[arg(long, env = "UPLOAD_FOLDER", default_value = DEFAULT_UPLOAD_FOLDER)]
    pub upload_folder: PathBuf,

    /// YOLOv8 ONNX export
    #[arg(long, env = "MODEL_PATH", default_value = "yolov8.onnx")]
    pub model_path: PathBuf,

    /// Where to download the model from when MODEL_PATH does not exist
    #[arg(long, env = "MODEL_URL")]
    pub model_url: Option<String>,

    /// One class name per line; only used when the model has no names metadata
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    /// TTF/OTF font for box captions
    #[arg(long, env = "FONT_PATH")]
    pub font_path: Option<PathBuf>,

    #[arg(long, env = "INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    #[arg(long, env = "CONF_THRESHOLD", default_value_t = 0.25)]
    pub conf_threshold: f32,

    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    #[arg(long, env = "INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,
}

impl AiServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("conf_threshold", self.conf_threshold)?;
        check_threshold("iou_threshold", self.iou_threshold)?;
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(ConfigError::InvalidInputSize(self.input_size));
        }
        if self.max_detections == 0 {
            return Err(ConfigError::NoDetectionsAllowed);
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_listen_addr(&self.host, self.port)
    }

    pub fn yolo_config(&self) -> YoloConfig {
        YoloConfig {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            input_size: self.input_size,
            params: DecodeParams {
                conf_threshold: self.conf_threshold,
                iou_threshold: self.iou_threshold,
                max_detections: self.max_detections,
            },
            intra_threads: self.intra_threads,
        }
    }
}

/// UI service: upload page and relay to the AI service
#[derive(Parser, Debug, Clone)]
#[command(name = "ui-service")]
#[command(about = "Upload page that relays images to the AI service", long_about = None)]
pub struct UiServiceConfig {
    #[arg(long, env = "UI_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "UI_PORT", default_value_t = 5050)]
    pub port: u16,

    /// Folder shared with the AI service
    #[arg(long, env = "UPLOAD_FOLDER", default_value = DEFAULT_UPLOAD_FOLDER)]
    pub upload_folder: PathBuf,

    /// Full URL of the AI service's detect endpoint
    #[arg(long, env = "AI_SERVICE_URL", default_value = DEFAULT_AI_SERVICE_URL)]
    pub ai_service_url: String,

    #[arg(long, env = "AI_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,
}

impl UiServiceConfig {
    /// Config pointing at `ai_service_url`, everything else at defaults
    pub fn with_ai_service_url(ai_service_url: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            ai_service_url: ai_service_url.into(),
            request_timeout_secs: 60,
            max_upload_bytes: MAX_IMAGE_SIZE,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServiceUrl {
            url: self.ai_service_url.clone(),
            reason,
        };

        let url = url::Url::parse(&self.ai_service_url).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_listen_addr(&self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
