// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod services;

pub use services::{
    AiServiceConfig, ConfigError, UiServiceConfig, DEFAULT_AI_SERVICE_URL, DEFAULT_UPLOAD_FOLDER,
};
