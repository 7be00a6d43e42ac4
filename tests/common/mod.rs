// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use detect_relay::{
    api::{ai_router, ui_router, AiAppState, AiClient, UiAppState},
    storage::SharedStorage,
    vision::{Annotator, Detection, Detector},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

pub const BOUNDARY: &str = "detect-relay-test-boundary";
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Detector that reports one box covering the top-left quarter
pub struct StubDetector;

impl Detector for StubDetector {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        let (w, h) = (image.width() as i32, image.height() as i32);
        Ok(vec![Detection::new("person", [0, 0, w / 2, h / 2], 0.87)])
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Detector that always fails
pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        anyhow::bail!("session exploded")
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Small solid PNG
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 40])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// PNG of pseudo-random pixels, so it does not compress below the raw size
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let image = RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        Rgb([state as u8, (state >> 8) as u8, (state >> 16) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// One multipart part: (field name, optional filename, content type, bytes)
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: "image/png",
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content_type: "text/plain",
            data: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// AI service router over `root`
pub async fn ai_app_in(root: &Path, detector: Arc<dyn Detector>) -> Router {
    ai_app_with_limit(root, detector, BODY_LIMIT).await
}

/// AI service router over `root` accepting uploads up to `limit` bytes
pub async fn ai_app_with_limit(root: &Path, detector: Arc<dyn Detector>, limit: usize) -> Router {
    let storage = SharedStorage::open(root).await.unwrap();
    let state = AiAppState::new(storage, detector, Annotator::without_font());
    ai_router(state, limit)
}

/// AI service router over a fresh temp folder
pub async fn ai_app(detector: Arc<dyn Detector>) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let router = ai_app_in(dir.path(), detector).await;
    (router, dir)
}

/// Bind `router` on an ephemeral port and return its address
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// UI service router over `root`, relaying to `ai_service_url`
pub async fn ui_app_in(root: &Path, ai_service_url: &str) -> Router {
    ui_app_with_limit(root, ai_service_url, BODY_LIMIT).await
}

/// UI service router over `root` accepting uploads up to `limit` bytes
pub async fn ui_app_with_limit(root: &Path, ai_service_url: &str, limit: usize) -> Router {
    let storage = SharedStorage::open(root).await.unwrap();
    let client = AiClient::new(ai_service_url, Duration::from_secs(30)).unwrap();
    ui_router(UiAppState::new(storage, client), limit)
}

/// URL nobody is listening on
pub fn dead_service_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/detect", port)
}
