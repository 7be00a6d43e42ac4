// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! UI service endpoints
//!
//! Provides GET / (upload page), POST /upload and GET /health.

pub mod handler;
pub mod response;

pub use handler::{health_handler, index_handler, upload_handler, IMAGE_FIELD, INDEX_HTML};
pub use response::UploadResponse;
