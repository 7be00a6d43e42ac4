// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pulling a single file part out of a multipart upload

use axum::http::StatusCode;
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;
use bytes::Bytes;

use super::errors::ApiError;

/// A file part read fully into memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, unsanitized and possibly empty
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Map a multipart read failure, naming `max_bytes` when the body hit the limit
fn read_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!(
            "Upload exceeds the {} byte limit",
            max_bytes
        ))
    } else {
        err.into()
    }
}

/// Return the first file part named `field_name`
///
/// Only parts that carry a filename count as files, the same way a browser
/// form distinguishes `<input type="file">` from text inputs. Other parts
/// are read and discarded.
pub async fn take_file_field(
    multipart: &mut Multipart,
    field_name: &str,
    max_bytes: usize,
) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, max_bytes))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| read_error(e, max_bytes))?;

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}
