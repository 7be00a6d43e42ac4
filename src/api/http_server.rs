// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Routers and server loop for the AI and UI services

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::Uri,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::ai_client::AiClient;
use super::errors::ApiError;
use super::{detect, upload};
use crate::storage::{url_basename, SharedStorage, UPLOADS_ROUTE};
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::{Annotator, Detector};

/// Shared state for the AI service
#[derive(Clone)]
pub struct AiAppState {
    pub storage: SharedStorage,
    pub detector: Arc<dyn Detector>,
    pub annotator: Arc<Annotator>,
    /// Largest accepted upload; set by `ai_router`
    pub max_upload_bytes: usize,
}

impl AiAppState {
    pub fn new(storage: SharedStorage, detector: Arc<dyn Detector>, annotator: Annotator) -> Self {
        Self {
            storage,
            detector,
            annotator: Arc::new(annotator),
            max_upload_bytes: MAX_IMAGE_SIZE,
        }
    }
}

/// Shared state for the UI service
#[derive(Clone)]
pub struct UiAppState {
    pub storage: SharedStorage,
    pub ai_client: Arc<AiClient>,
    /// Largest accepted upload; set by `ui_router`
    pub max_upload_bytes: usize,
}

impl UiAppState {
    pub fn new(storage: SharedStorage, ai_client: AiClient) -> Self {
        Self {
            storage,
            ai_client: Arc::new(ai_client),
            max_upload_bytes: MAX_IMAGE_SIZE,
        }
    }
}

/// 404 body for `/uploads` misses
async fn upload_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("File not found: {}", url_basename(uri.path())))
}

/// GET /uploads/* from the shared folder, with JSON 404s
fn uploads_router<S>(storage: &SharedStorage) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let files = ServeDir::new(storage.root()).not_found_service(upload_not_found.into_service());
    Router::new().nest_service(UPLOADS_ROUTE, files)
}

/// POST /detect, GET /uploads/*, GET /health
pub fn ai_router(state: AiAppState, max_upload_bytes: usize) -> Router {
    let state = AiAppState {
        max_upload_bytes,
        ..state
    };
    let uploads = uploads_router(&state.storage);

    Router::new()
        .route("/detect", post(detect::detect_handler))
        .route("/health", get(detect::health_handler))
        .merge(uploads)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /, POST /upload, GET /uploads/*, GET /health
pub fn ui_router(state: UiAppState, max_upload_bytes: usize) -> Router {
    let state = UiAppState {
        max_upload_bytes,
        ..state
    };
    let uploads = uploads_router(&state.storage);

    Router::new()
        .route("/", get(upload::index_handler))
        .route("/upload", post(upload::upload_handler))
        .route("/health", get(upload::health_handler))
        .merge(uploads)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `router` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server on {} stopped", addr);
    Ok(())
}

/// Serve `router` until Ctrl+C
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    serve_with_shutdown(listener, router, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await
}
