// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class names for YOLO exports

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

/// The 80 COCO classes YOLOv8 checkpoints are trained on
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

pub fn coco_labels() -> Vec<String> {
    COCO_CLASSES.iter().map(|s| s.to_string()).collect()
}

/// Parse the `names` metadata string written by ultralytics ONNX exports
///
/// Format: `{0: 'person', 1: 'bicycle', ..., 27: "yellow_lady's_slipper"}`
pub fn parse_names_metadata(names: &str) -> Option<Vec<String>> {
    let re = Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#).ok()?;

    let mut entries: Vec<(usize, String)> = re
        .captures_iter(names)
        .filter_map(|caps| {
            let index = caps.get(1)?.as_str().parse::<usize>().ok()?;
            let name = caps.get(2).or_else(|| caps.get(3))?.as_str().to_string();
            Some((index, name))
        })
        .collect();

    if entries.is_empty() {
        return None;
    }

    entries.sort_by_key(|(index, _)| *index);
    let len = entries.last().map(|(index, _)| index + 1).unwrap_or(0);
    let mut labels: Vec<String> = (0..len).map(|i| format!("class_{}", i)).collect();
    for (index, name) in entries {
        labels[index] = name;
    }
    Some(labels)
}

/// Load one label per line, skipping blank lines
pub fn load_labels_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read labels file {}", path.display()))?;

    let labels: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        anyhow::bail!("Labels file {} is empty", path.display());
    }
    Ok(labels)
}
