mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use helpers::{test_app, TOPIC};
use vignette_worker::test_helpers::sample_jpeg;

#[tokio::test]
async fn test_presign_returns_credential_and_pending_record() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let response = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["upload_url"].as_str().unwrap().starts_with("https://"));
    assert!(body["storage_key"].as_str().unwrap().ends_with("_cat.jpg"));
    assert_eq!(body["expires_in_seconds"], 900);

    // Record persisted as pending; nothing published yet.
    assert_eq!(app.files.len(), 1);
    assert_eq!(app.channel.pending(TOPIC), 0);
}

#[tokio::test]
async fn test_presign_rejects_empty_filename() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let response = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "", "content_type": "image/jpeg" }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["recoverable"], false);
}

#[tokio::test]
async fn test_confirm_unknown_file_is_404() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let response = server
        .post("/api/v0/files/confirm/00000000-0000-0000-0000-000000000000")
        .await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_confirm_twice_is_conflict_with_single_event() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let presign: Value = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await
        .json();
    let file_id = presign["file_id"].as_str().unwrap().to_string();

    let first = server
        .post(&format!("/api/v0/files/confirm/{}", file_id))
        .await;
    first.assert_status_ok();
    let confirmed: Value = first.json();
    assert_eq!(confirmed["status"], "uploaded");
    assert_eq!(app.channel.pending(TOPIC), 1);

    let second = server
        .post(&format!("/api/v0/files/confirm/{}", file_id))
        .await;
    second.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = second.json();
    assert_eq!(body["code"], "INVALID_STATE");
    // Still exactly one event.
    assert_eq!(app.channel.pending(TOPIC), 1);
}

#[tokio::test]
async fn test_get_file_roundtrip() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let presign: Value = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await
        .json();
    let file_id = presign["file_id"].as_str().unwrap().to_string();

    let response = server.get(&format!("/api/v0/files/{}", file_id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["original_name"], "cat.jpg");
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_direct_upload_stores_bytes_and_publishes() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let image = sample_jpeg(64, 64);
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(image.clone())
            .file_name("cat.jpg")
            .mime_type("image/jpeg"),
    );

    let response = server.post("/api/v0/files/upload").multipart(form).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "uploaded");
    let storage_key = body["storage_key"].as_str().unwrap();
    assert_eq!(app.storage.get_file(storage_key).unwrap(), image);
    assert_eq!(app.channel.pending(TOPIC), 1);
}

#[tokio::test]
async fn test_download_url_for_known_file() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let presign: Value = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await
        .json();
    let file_id = presign["file_id"].as_str().unwrap().to_string();
    let storage_key = presign["storage_key"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/v0/files/{}/download-url", file_id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["url"].as_str().unwrap().contains(&storage_key));
    assert_eq!(body["expires_in_seconds"], 3600);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let server = TestServer::new(app.router).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();
}
