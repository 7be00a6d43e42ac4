// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload endpoint handler

use axum::{extract::State, response::Html, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, info};

use super::response::UploadResponse;
use crate::api::detect::HealthResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::UiAppState;
use crate::api::multipart::take_file_field;
use crate::storage::sanitize_filename;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Upload page served at GET /
pub const INDEX_HTML: &str = include_str!("index.html");

/// GET / - Upload page
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /upload - Store an image and relay it to the AI service
///
/// # Request
/// - multipart field `image`: the image to analyse
///
/// # Response
/// - `input_image`: stored filename
/// - `output_image`: annotated filename
/// - `output_img_url`: URL of the annotated image
/// - `detections`: detections as returned by the AI service
///
/// # Errors
/// - 400: no `image` part, empty filename or empty file
/// - 413: upload over the configured limit
/// - 500: AI service unreachable, non-200, or unreadable reply
pub async fn upload_handler(
    State(state): State<UiAppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let upload = take_file_field(&mut multipart, IMAGE_FIELD, state.max_upload_bytes)
        .await?
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    if upload.filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }
    if upload.bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let filename = sanitize_filename(&upload.filename)?;

    state.storage.ensure_dir().await?;
    state.storage.save(&filename, &upload.bytes).await?;

    let saved = state.storage.read(&filename).await?;
    debug!("Relaying {} ({} bytes) to AI service", filename, saved.len());

    let reply = state
        .ai_client
        .detect(&filename, upload.content_type.as_deref(), saved)
        .await?;

    info!(
        "AI service returned {} detections for {}",
        reply.detections.len(),
        filename
    );

    Ok(Json(UploadResponse::from_reply(&filename, reply)))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok(None))
}
