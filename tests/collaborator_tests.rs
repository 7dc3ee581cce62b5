//! Behavior of the external-collaborator seams (mail relay, image host)
//! through their recording test doubles.

use shopnest::errors::AppError;
use shopnest::services::image_store::{ImageStore, RecordingImageStore};
use shopnest::services::mailer::{Mailer, RecordingMailer};

#[tokio::test]
async fn recording_mailer_captures_every_send() {
  let mailer = RecordingMailer::new();
  mailer
    .send("ada@example.com", "noreply@shopnest.example", "Hello", "<p>Hi</p>")
    .await
    .unwrap();

  let sent = mailer.sent.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to, "ada@example.com");
  assert_eq!(sent[0].subject, "Hello");
}

#[tokio::test]
async fn a_failing_relay_surfaces_as_an_upstream_error() {
  let mailer = RecordingMailer::failing();
  let err = mailer
    .send("ada@example.com", "noreply@shopnest.example", "Hello", "<p>Hi</p>")
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Upstream { .. }));
  assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn upload_then_delete_releases_the_same_reference() {
  let store = RecordingImageStore::new();
  let stored = store.upload("avatars", "base64-bytes").await.unwrap();
  store.delete(&stored.public_id).await.unwrap();

  let deleted = store.deleted.lock().unwrap();
  assert_eq!(deleted.as_slice(), &[stored.public_id.clone()]);
}

#[tokio::test]
async fn one_delete_call_per_stored_image_reference() {
  // Mirrors account/product deletion: every stored reference is released
  // exactly once, no more.
  let store = RecordingImageStore::new();
  let a = store.upload("products", "first").await.unwrap();
  let b = store.upload("products", "second").await.unwrap();

  for image in [&a, &b] {
    store.delete(&image.public_id).await.unwrap();
  }

  let deleted = store.deleted.lock().unwrap();
  assert_eq!(deleted.len(), 2);
  assert!(deleted.contains(&a.public_id));
  assert!(deleted.contains(&b.public_id));
}
