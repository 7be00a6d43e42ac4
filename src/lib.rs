// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod storage;
pub mod version;
pub mod vision;

pub use api::{ai_router, ui_router, AiAppState, AiClient, ApiError, UiAppState};
pub use config::{AiServiceConfig, UiServiceConfig};
pub use storage::SharedStorage;
pub use vision::{Annotator, Detection, Detector, YoloDetector};
