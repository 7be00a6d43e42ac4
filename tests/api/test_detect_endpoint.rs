// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detect endpoint tests for POST /detect
//!
//! These tests verify that the AI service router:
//! - Rejects requests without a usable `file` part
//! - Stores the upload and its annotated copy
//! - Serves stored files under /uploads
//! - Reports detector failures as 500

use std::sync::Arc;

use axum::http::StatusCode;
use tower::ServiceExt;

use crate::common::{
    ai_app, ai_app_with_limit, body_bytes, body_json, get_request, multipart_request, noise_png,
    png_bytes, FailingDetector, Part, StubDetector,
};

const MIB: usize = 1024 * 1024;

/// Test 1: Valid PNG returns detections and the annotated URL
#[tokio::test]
async fn test_detect_returns_detections_and_url() {
    let (app, dir) = ai_app(Arc::new(StubDetector)).await;
    let png = png_bytes(64, 48);

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("file", "cat.png", &png)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["image_url"], "/uploads/boxed_cat.png");

    let detections = json["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0]["label"], "person");
    assert_eq!(detections[0]["box"], serde_json::json!([0, 0, 32, 24]));

    assert!(dir.path().join("cat.png").exists());
    assert!(dir.path().join("boxed_cat.png").exists());
}

/// Test 2: Annotated copy decodes with the upload's dimensions
#[tokio::test]
async fn test_annotated_copy_keeps_dimensions() {
    let (app, dir) = ai_app(Arc::new(StubDetector)).await;
    let png = png_bytes(40, 30);

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("file", "dims.png", &png)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let boxed = image::open(dir.path().join("boxed_dims.png")).unwrap();
    assert_eq!((boxed.width(), boxed.height()), (40, 30));
}

/// Test 3: No `file` part is a 400 with a JSON error
#[tokio::test]
async fn test_missing_file_field() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;
    let png = png_bytes(8, 8);

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("image", "cat.png", &png)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file in request");
}

/// Test 4: A text field named `file` is not a file
#[tokio::test]
async fn test_text_field_is_not_a_file() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;

    let response = app
        .oneshot(multipart_request("/detect", &[Part::text("file", "hello")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test 5: Empty filename is rejected
#[tokio::test]
async fn test_empty_filename() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;
    let png = png_bytes(8, 8);

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("file", "", &png)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No selected file");
}

/// Test 6: Bytes that are not an image are a 400
#[tokio::test]
async fn test_undecodable_image() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;

    let response = app
        .oneshot(multipart_request(
            "/detect",
            &[Part::file("file", "notes.png", b"definitely not a png")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Invalid image"));
}

/// Test 7: Traversal filenames are stored inside the upload folder
#[tokio::test]
async fn test_traversal_filename_is_sanitized() {
    let (app, dir) = ai_app(Arc::new(StubDetector)).await;
    let png = png_bytes(8, 8);

    let response = app
        .oneshot(multipart_request(
            "/detect",
            &[Part::file("file", "../../escape.png", &png)],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["image_url"], "/uploads/boxed_escape.png");
    assert!(dir.path().join("escape.png").exists());
}

/// Test 8: Detector failure is a 500
#[tokio::test]
async fn test_detector_failure() {
    let (app, _dir) = ai_app(Arc::new(FailingDetector)).await;
    let png = png_bytes(8, 8);

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("file", "a.png", &png)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("session exploded"));
}

/// Test 9: Annotated output is served under /uploads
#[tokio::test]
async fn test_annotated_image_is_served() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;
    let png = png_bytes(16, 16);

    let response = app
        .clone()
        .oneshot(multipart_request("/detect", &[Part::file("file", "s.png", &png)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/uploads/boxed_s.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

/// Test 10: Unknown upload is a 404 with a JSON error
#[tokio::test]
async fn test_unknown_upload_not_found() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;

    let response = app
        .oneshot(get_request("/uploads/missing.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File not found: missing.png");
}

/// Test 11: Health reports the model name
#[tokio::test]
async fn test_health() {
    let (app, _dir) = ai_app(Arc::new(StubDetector)).await;

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"status": "ok", "model": "stub"}));
}

/// Test 12: Body over the limit is a 413 naming the limit
#[tokio::test]
async fn test_body_over_limit() {
    let dir = tempfile::tempdir().unwrap();
    let app = ai_app_with_limit(dir.path(), Arc::new(StubDetector), MIB).await;
    let oversized = vec![0x89u8; 2 * MIB];

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("file", "big.png", &oversized)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        format!("Upload exceeds the {} byte limit", MIB)
    );
    assert!(!dir.path().join("big.png").exists());
}

/// Test 13: A raised limit accepts uploads over the 10 MiB default
#[tokio::test]
async fn test_raised_limit_accepts_large_image() {
    let dir = tempfile::tempdir().unwrap();
    let app = ai_app_with_limit(dir.path(), Arc::new(StubDetector), 32 * MIB).await;
    let large = noise_png(2048, 2048);
    assert!(large.len() > 12 * MIB, "fixture is only {} bytes", large.len());

    let response = app
        .oneshot(multipart_request("/detect", &[Part::file("file", "large.png", &large)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["image_url"], "/uploads/boxed_large.png");
    assert!(dir.path().join("boxed_large.png").exists());
}
