// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 ONNX detector
//!
//! Loads an ultralytics YOLOv8 export and runs it on CPU through ONNX Runtime.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info, warn};

use super::labels::{coco_labels, load_labels_file, parse_names_metadata};
use super::postprocess::{decode_output, DecodeParams};
use super::preprocessing::{preprocess, YOLO_INPUT_SIZE};
use crate::vision::detection::{Detection, Detector};

/// Settings for loading a YOLO model
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX export
    pub model_path: PathBuf,
    /// Optional labels file, used when the export carries no `names` metadata
    pub labels_path: Option<PathBuf>,
    /// Square input size the model was exported with
    pub input_size: u32,
    pub params: DecodeParams,
    pub intra_threads: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("yolov8.onnx"),
            labels_path: None,
            input_size: YOLO_INPUT_SIZE,
            params: DecodeParams::default(),
            intra_threads: 4,
        }
    }
}

/// YOLOv8 object detector backed by an ONNX Runtime session
pub struct YoloDetector {
    /// `Session::run` needs `&mut`, so inference is serialized
    session: Mutex<Session>,
    input_name: String,
    labels: Vec<String>,
    input_size: u32,
    params: DecodeParams,
    model_name: String,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("num_labels", &self.labels.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - A configured labels file cannot be read
    pub fn new(config: &YoloConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();
        if !model_path.exists() {
            anyhow::bail!("YOLO model not found: {}", model_path.display());
        }

        info!("Loading YOLO model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load YOLO model from {}", model_path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let labels = Self::resolve_labels(&session, config.labels_path.as_deref())?;

        let model_name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolov8".to_string());

        info!(
            "✅ YOLO model '{}' loaded (input: {}, {} classes, CPU-only)",
            model_name,
            input_name,
            labels.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            labels,
            input_size: config.input_size,
            params: config.params,
            model_name,
        })
    }

    /// Class names: model metadata first, then the labels file, then COCO
    fn resolve_labels(session: &Session, labels_path: Option<&Path>) -> Result<Vec<String>> {
        let from_metadata = session
            .metadata()
            .ok()
            .and_then(|meta| meta.custom("names").ok().flatten())
            .and_then(|names| parse_names_metadata(&names));

        if let Some(labels) = from_metadata {
            debug!("Using {} class names from model metadata", labels.len());
            return Ok(labels);
        }

        if let Some(path) = labels_path {
            return load_labels_file(path);
        }

        warn!("Model has no class names metadata, falling back to COCO labels");
        Ok(coco_labels())
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let start = Instant::now();
        let (input, letterbox) = preprocess(image, self.input_size);

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("YOLO session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("YOLO inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("YOLO output shape: {:?}", output.shape());

        let detections = decode_output(output, &letterbox, &self.labels, &self.params)?;

        debug!(
            "Detected {} objects in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
