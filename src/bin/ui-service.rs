// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use detect_relay::{
    api::{serve, ui_router, AiClient, UiAppState},
    config::UiServiceConfig,
    storage::SharedStorage,
    version,
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

    let config = UiServiceConfig::parse();
    config.validate().context("Invalid UI service configuration")?;

    info!("{}", version::get_version_string("ui-service"));
    info!("Features: {}", version::FEATURES.join(", "));

    let storage = SharedStorage::open(&config.upload_folder)
        .await
        .with_context(|| format!("Cannot open upload folder {}", config.upload_folder.display()))?;
    info!("Upload folder: {}", storage.root().display());

    let ai_client = AiClient::new(&config.ai_service_url, config.request_timeout())
        .context("Failed to build AI service client")?;
    info!("Relaying uploads to {}", ai_client.detect_url());

    let state = UiAppState::new(storage, ai_client);
    let router = ui_router(state, config.max_upload_bytes);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;

    serve(listener, router).await?;
    Ok(())
}
