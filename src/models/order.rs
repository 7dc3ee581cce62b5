use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "PascalCase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      OrderStatus::Pending => "Pending",
      OrderStatus::Processing => "Processing",
      OrderStatus::Shipped => "Shipped",
      OrderStatus::Delivered => "Delivered",
      OrderStatus::Cancelled => "Cancelled",
    };
    write!(f, "{}", s)
  }
}

impl std::str::FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Pending" => Ok(OrderStatus::Pending),
      "Processing" => Ok(OrderStatus::Processing),
      "Shipped" => Ok(OrderStatus::Shipped),
      "Delivered" => Ok(OrderStatus::Delivered),
      "Cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(format!("Unknown order status '{}'", other)),
    }
  }
}

/// Embedded shipping address. Every field is required at order creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShippingInfo {
  #[sqlx(rename = "shipping_address")]
  pub address: String,
  #[sqlx(rename = "shipping_city")]
  pub city: String,
  #[sqlx(rename = "shipping_state")]
  pub state: String,
  #[sqlx(rename = "shipping_country")]
  pub country: String,
  #[serde(rename = "postalCode")]
  #[sqlx(rename = "shipping_postal_code")]
  pub postal_code: String,
  #[sqlx(rename = "shipping_phone")]
  pub phone: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  #[serde(rename = "userId")]
  pub user_id: Uuid,
  pub status: OrderStatus,
  #[serde(rename = "shippingInfo")]
  #[sqlx(flatten)]
  pub shipping_info: ShippingInfo,
  #[serde(rename = "paymentId")]
  pub payment_id: String,
  #[serde(rename = "paymentStatus")]
  pub payment_status: String,
  #[serde(rename = "paidAt")]
  pub paid_at: DateTime<Utc>,
  #[serde(rename = "itemPriceCents")]
  pub item_price_cents: i64,
  #[serde(rename = "taxPriceCents")]
  pub tax_price_cents: i64,
  #[serde(rename = "shippingPriceCents")]
  pub shipping_price_cents: i64,
  #[serde(rename = "totalPriceCents")]
  pub total_price_cents: i64,
  #[serde(rename = "deliveredAt")]
  pub delivered_at: Option<DateTime<Utc>>,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_round_trips_through_its_string_form() {
    for status in [
      OrderStatus::Pending,
      OrderStatus::Processing,
      OrderStatus::Shipped,
      OrderStatus::Delivered,
      OrderStatus::Cancelled,
    ] {
      assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
    }
    assert!("Refunded".parse::<OrderStatus>().is_err());
  }
}
