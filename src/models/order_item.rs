use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable snapshot of a purchased product at checkout time.
///
/// Name, price, and image are copied so that later product edits or deletions
/// never corrupt historical orders. `product_id` is the only live link back
/// to inventory and is used solely by the stock adjustment routine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  #[serde(rename = "orderId")]
  pub order_id: Uuid,
  #[serde(rename = "productId")]
  pub product_id: Uuid,
  pub name: String,
  #[serde(rename = "priceCents")]
  pub price_cents: i64,
  pub quantity: i32,
  #[serde(rename = "imageUrl")]
  pub image_url: String,
}
