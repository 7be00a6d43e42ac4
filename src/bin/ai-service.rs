// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use detect_relay::{
    api::{ai_router, serve, AiAppState},
    config::AiServiceConfig,
    storage::SharedStorage,
    version,
    vision::{Annotator, VisionModelManager},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = AiServiceConfig::parse();
    config.validate().context("Invalid AI service configuration")?;

    info!("{}", version::get_version_string("ai-service"));
    info!("Features: {}", version::FEATURES.join(", "));

    let storage = SharedStorage::open(&config.upload_folder)
        .await
        .with_context(|| format!("Cannot open upload folder {}", config.upload_folder.display()))?;
    info!("Upload folder: {}", storage.root().display());

    let manager = VisionModelManager::load(config.yolo_config(), config.model_url.as_deref())
        .await
        .context("Failed to load detection model")?;
    for model in manager.list_models() {
        info!("Model ready: {} ({})", model.name, model.model_type);
    }

    let annotator = Annotator::new(config.font_path.as_deref());

    let state = AiAppState::new(storage, manager.detector(), annotator);
    let router = ai_router(state, config.max_upload_bytes);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;

    serve(listener, router).await?;
    Ok(())
}
