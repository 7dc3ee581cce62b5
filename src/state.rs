use crate::config::AppConfig;
use crate::services::{ImageStore, Mailer};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared per-worker application state.
#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub config: Arc<AppConfig>,
  pub mailer: Arc<dyn Mailer>,
  pub image_store: Arc<dyn ImageStore>,
}
