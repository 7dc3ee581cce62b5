use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A product review. One row per (product, reviewer); re-submitting replaces
/// the earlier rating and comment.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
  pub id: Uuid,
  #[serde(rename = "productId")]
  pub product_id: Uuid,
  #[serde(rename = "userId")]
  pub user_id: Uuid,
  /// Reviewer display name captured at write time.
  #[serde(rename = "reviewerName")]
  pub reviewer_name: String,
  pub rating: i32,
  pub comment: String,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
}
