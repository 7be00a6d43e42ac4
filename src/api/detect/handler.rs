// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, info};

use super::response::{DetectResponse, HealthResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AiAppState;
use crate::api::multipart::take_file_field;
use crate::storage::{annotated_name, sanitize_filename};
use crate::vision::image_utils::{encode_image, format_to_extension, output_format_for};
use crate::vision::{decode_image_bytes_with_limit, Detection};

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// POST /detect - Run object detection on an uploaded image
///
/// # Request
/// - multipart field `file`: the image (PNG, JPEG, WebP, GIF, BMP, TIFF)
///
/// # Response
/// - `detections`: `[{label, box: [x1, y1, x2, y2], confidence}]`
/// - `image_url`: `/uploads/boxed_<filename>`, the annotated copy
///
/// # Errors
/// - 400: no `file` part, empty filename, or undecodable image
/// - 413: upload over the configured limit
/// - 500: detection or storage failure
pub async fn detect_handler(
    State(state): State<AiAppState>,
    mut multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let upload = take_file_field(&mut multipart, FILE_FIELD, state.max_upload_bytes)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file in request".to_string()))?;

    if upload.filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }

    let filename = sanitize_filename(&upload.filename)?;
    state.storage.save(&filename, &upload.bytes).await?;

    let (image, info) = decode_image_bytes_with_limit(&upload.bytes, state.max_upload_bytes)?;
    debug!(
        "Decoded {}: {}x{} {}, {} bytes",
        filename,
        info.width,
        info.height,
        format_to_extension(info.format),
        info.size_bytes
    );

    let output_name = annotated_name(&filename);
    let output_format = output_format_for(&output_name);
    let detector = state.detector.clone();
    let annotator = state.annotator.clone();

    let (detections, annotated): (Vec<Detection>, Vec<u8>) =
        tokio::task::spawn_blocking(move || {
            let detections = detector
                .detect(&image)
                .map_err(|e| ApiError::Internal(format!("Detection failed: {}", e)))?;
            let boxed = annotator.annotate(&image, &detections);
            let bytes = encode_image(&boxed, output_format)?;
            Ok::<_, ApiError>((detections, bytes))
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Detection task failed: {}", e)))??;

    state.storage.save(&output_name, &annotated).await?;

    info!(
        "Detected {} objects in {} (model: {})",
        detections.len(),
        filename,
        state.detector.model_name()
    );

    Ok(Json(DetectResponse::new(detections, &filename)))
}

/// GET /health
pub async fn health_handler(State(state): State<AiAppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(Some(state.detector.model_name())))
}
