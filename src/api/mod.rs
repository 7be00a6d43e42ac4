// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ai_client;
pub mod detect;
pub mod errors;
pub mod http_server;
pub mod multipart;
pub mod upload;

pub use ai_client::{AiClient, AiClientError, AiDetectReply};
pub use detect::{detect_handler, DetectResponse, HealthResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{ai_router, serve, serve_with_shutdown, ui_router, AiAppState, UiAppState};
pub use upload::{index_handler, upload_handler, UploadResponse};
