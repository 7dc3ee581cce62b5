//! Image host seam.
//!
//! Product and avatar images live at an external store; the application
//! holds only (public id, URL) references and calls out through this trait.

use crate::errors::{AppError, Result as AppResult};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
  pub public_id: String,
  pub url: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
  /// Uploads base64/url image data into `folder`, returning the stored
  /// reference.
  async fn upload(&self, folder: &str, data: &str) -> AppResult<StoredImage>;

  /// Deletes one stored image by its public id.
  async fn delete(&self, public_id: &str) -> AppResult<()>;
}

/// Logs instead of talking to the image host. Development stand-in.
pub struct LogImageStore;

#[async_trait]
impl ImageStore for LogImageStore {
  async fn upload(&self, folder: &str, _data: &str) -> AppResult<StoredImage> {
    let public_id = format!("{}/{}", folder, uuid::Uuid::new_v4());
    info!("Image store (log only): upload into '{}' as '{}'", folder, public_id);
    Ok(StoredImage {
      url: format!("https://images.invalid/{}", public_id),
      public_id,
    })
  }

  async fn delete(&self, public_id: &str) -> AppResult<()> {
    info!("Image store (log only): delete '{}'", public_id);
    Ok(())
  }
}

/// Test double that records uploads and deletions.
pub struct RecordingImageStore {
  pub uploaded: Mutex<Vec<StoredImage>>,
  pub deleted: Mutex<Vec<String>>,
  pub fail: bool,
}

impl RecordingImageStore {
  pub fn new() -> Self {
    Self {
      uploaded: Mutex::new(Vec::new()),
      deleted: Mutex::new(Vec::new()),
      fail: false,
    }
  }
}

impl Default for RecordingImageStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
  async fn upload(&self, folder: &str, data: &str) -> AppResult<StoredImage> {
    if self.fail {
      return Err(AppError::Upstream {
        source: anyhow::anyhow!("simulated image host failure"),
      });
    }
    let image = StoredImage {
      public_id: format!("{}/{}", folder, data),
      url: format!("https://images.invalid/{}/{}", folder, data),
    };
    self.uploaded.lock().unwrap().push(image.clone());
    Ok(image)
  }

  async fn delete(&self, public_id: &str) -> AppResult<()> {
    if self.fail {
      return Err(AppError::Upstream {
        source: anyhow::anyhow!("simulated image host failure"),
      });
    }
    self.deleted.lock().unwrap().push(public_id.to_string());
    Ok(())
  }
}
