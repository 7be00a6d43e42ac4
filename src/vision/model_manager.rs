// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector provisioning: fetch the model file if needed, then load it

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::vision::detection::Detector;
use crate::vision::yolo::{YoloConfig, YoloDetector};

/// Information about the loaded detection model
#[derive(Debug, Clone)]
pub struct VisionModelInfo {
    pub name: String,
    pub model_type: String,
    pub available: bool,
}

/// Holds the detector the AI service runs requests through
pub struct VisionModelManager {
    detector: Arc<dyn Detector>,
}

impl VisionModelManager {
    /// Make sure the model file exists, downloading it from `model_url` when
    /// it is missing, then load it on the blocking pool
    pub async fn load(config: YoloConfig, model_url: Option<&str>) -> Result<Self> {
        ensure_model_file(&config.model_path, model_url).await?;

        let detector = tokio::task::spawn_blocking(move || YoloDetector::new(&config))
            .await
            .context("Model loading task panicked")??;

        Ok(Self::from_detector(Arc::new(detector)))
    }

    /// Wrap an already constructed detector
    pub fn from_detector(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> Arc<dyn Detector> {
        self.detector.clone()
    }

    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![VisionModelInfo {
            name: self.detector.model_name().to_string(),
            model_type: "object-detection".to_string(),
            available: true,
        }]
    }
}

/// Download the model to `path` if it does not exist yet
///
/// The body is streamed into a `.part` file which is renamed on completion,
/// so an interrupted download never leaves a truncated model behind.
pub async fn ensure_model_file(path: &Path, model_url: Option<&str>) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let url = match model_url {
        Some(url) => url,
        None => anyhow::bail!(
            "YOLO model not found at {} and no model URL configured",
            path.display()
        ),
    };

    warn!("{} not found. Downloading from {}...", path.display(), url);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(600))
        .build()?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to request model from {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Model download from {} returned {}", url, response.status());
    }

    let part_path = path.with_extension("part");
    let mut file = tokio::fs::File::create(&part_path)
        .await
        .with_context(|| format!("Failed to create {}", part_path.display()))?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Model download interrupted")?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&part_path, path)
        .await
        .with_context(|| format!("Failed to move model into {}", path.display()))?;

    info!("✅ Downloaded {} bytes to {}", downloaded, path.display());
    Ok(())
}
