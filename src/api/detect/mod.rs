// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AI service endpoints
//!
//! Provides POST /detect and GET /health.

pub mod handler;
pub mod response;

pub use handler::{detect_handler, health_handler, FILE_FIELD};
pub use response::{DetectResponse, HealthResponse};
