use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  #[serde(rename = "priceCents")]
  pub price_cents: i64,
  /// Derived: average of all review ratings, 0.0 when there are none.
  pub rating: f64,
  pub category: String,
  pub stock: i32,
  /// Derived: must always equal the number of rows in `reviews` for this product.
  #[serde(rename = "numberOfReviews")]
  pub review_count: i32,
  #[serde(rename = "userId")]
  pub user_id: Uuid,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt")]
  pub updated_at: DateTime<Utc>,
}

/// One stored image reference: an opaque id at the image host plus its URL.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductImage {
  pub id: Uuid,
  #[serde(rename = "productId")]
  pub product_id: Uuid,
  #[serde(rename = "publicId")]
  pub public_id: String,
  pub url: String,
}
