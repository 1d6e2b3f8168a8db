//! End-to-end pipeline tests: presign -> client PUT -> confirm -> event ->
//! worker -> derivative record + callback, over in-memory collaborators.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use image::GenericImageView;
use serde_json::{json, Value};
use tokio::time::sleep;

use helpers::{test_app, TestApp, TOPIC};
use vignette_processing::ThumbnailSpec;
use vignette_worker::test_helpers::{sample_jpeg, RecordingNotifier};
use vignette_worker::{ThumbnailProcessor, ThumbnailWorker};

fn spawn_worker(app: &TestApp, notifier: Arc<RecordingNotifier>) -> ThumbnailWorker {
    let processor = Arc::new(ThumbnailProcessor::new(
        app.storage.clone(),
        app.derivatives.clone(),
        notifier,
        ThumbnailSpec {
            width: 320,
            height: 240,
        },
    ));
    ThumbnailWorker::spawn(Arc::new(app.channel.clone()), processor)
}

async fn wait_for_jobs(app: &TestApp, count: usize) {
    for _ in 0..100 {
        if app.derivatives.len() >= count && app.channel.pending(TOPIC) == 0 {
            // One more settle pass so in-flight status writes land.
            sleep(Duration::from_millis(50)).await;
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("worker did not process {} job(s) in time", count);
}

#[tokio::test]
async fn test_upload_confirm_thumbnail_success_flow() {
    let app = test_app();
    let server = TestServer::new(app.router.clone()).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let worker = spawn_worker(&app, notifier.clone());

    // Issue a credential for cat.jpg.
    let presign: Value = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await
        .json();
    let file_id = presign["file_id"].as_str().unwrap().to_string();
    let storage_key = presign["storage_key"].as_str().unwrap().to_string();

    // The client uploads directly to the object store with the credential.
    app.storage.set_file(&storage_key, sample_jpeg(1024, 768));

    // Confirm; the event fires and the worker picks it up.
    let confirm = server
        .post(&format!("/api/v0/files/confirm/{}", file_id))
        .await;
    confirm.assert_status_ok();

    wait_for_jobs(&app, 1).await;
    worker.shutdown().await;

    // Derivative record is successful and addressed deterministically.
    let thumbnails: Value = server
        .get(&format!("/api/v0/files/{}/thumbnails", file_id))
        .await
        .json();
    let jobs = thumbnails.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status"], "success");
    assert_eq!(
        jobs[0]["derivative_storage_key"],
        format!("thumbnails/{}", storage_key)
    );

    // The thumbnail object exists and decodes within the configured box.
    let thumb = app
        .storage
        .get_file(&format!("thumbnails/{}", storage_key))
        .unwrap();
    let decoded = image::load_from_memory(&thumb).unwrap();
    assert!(decoded.width() <= 320);
    assert!(decoded.height() <= 240);

    // Callback invoked exactly once, with the successful record.
    let notified = notifier.notifications();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].original_storage_key, storage_key);
}

#[tokio::test]
async fn test_lying_client_confirm_ends_in_failed_job() {
    let app = test_app();
    let server = TestServer::new(app.router.clone()).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let worker = spawn_worker(&app, notifier.clone());

    // Issue a credential but never upload anything.
    let presign: Value = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await
        .json();
    let file_id = presign["file_id"].as_str().unwrap().to_string();

    // Confirmation does not verify the object exists, so it succeeds.
    let confirm = server
        .post(&format!("/api/v0/files/confirm/{}", file_id))
        .await;
    confirm.assert_status_ok();

    wait_for_jobs(&app, 1).await;
    worker.shutdown().await;

    // The worker could not fetch the original; the job is failed, no callback.
    let thumbnails: Value = server
        .get(&format!("/api/v0/files/{}/thumbnails", file_id))
        .await
        .json();
    let jobs = thumbnails.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status"], "failed");
    assert!(jobs[0]["error_message"].as_str().is_some());
    assert!(notifier.notifications().is_empty());

    // Failure is visible through the job endpoint as well.
    let job_id = jobs[0]["id"].as_str().unwrap();
    let job: Value = server
        .get(&format!("/api/v0/thumbnails/{}", job_id))
        .await
        .json();
    assert_eq!(job["status"], "failed");
}

#[tokio::test]
async fn test_duplicate_event_delivery_is_tolerated() {
    let app = test_app();
    let server = TestServer::new(app.router.clone()).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());

    let presign: Value = server
        .post("/api/v0/files/presign")
        .json(&json!({ "filename": "cat.jpg", "content_type": "image/jpeg" }))
        .await
        .json();
    let file_id = presign["file_id"].as_str().unwrap().to_string();
    let storage_key = presign["storage_key"].as_str().unwrap().to_string();
    app.storage.set_file(&storage_key, sample_jpeg(1024, 768));

    server
        .post(&format!("/api/v0/files/confirm/{}", file_id))
        .await
        .assert_status_ok();

    // Simulate at-least-once redelivery of the same event.
    use vignette_events::{EventConsumer, EventPublisher};
    let delivery = app.channel.next().await.unwrap().unwrap();
    app.channel.publish(TOPIC, &delivery.payload).await.unwrap();
    app.channel.publish(TOPIC, &delivery.payload).await.unwrap();

    let worker = spawn_worker(&app, notifier.clone());
    wait_for_jobs(&app, 2).await;
    worker.shutdown().await;

    // Two independent job records, both successful, same derivative key.
    let records = app.derivatives.all();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.status == vignette_core::models::DerivativeStatus::Success));
    assert!(records.iter().all(|r| {
        r.derivative_storage_key == format!("thumbnails/{}", storage_key)
    }));
    assert_eq!(notifier.notifications().len(), 2);
}
