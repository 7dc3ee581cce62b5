//! Order persistence and the status-transition executor.
//!
//! A status transition is planned by `domain::fulfillment` and applied here
//! in one transaction: the order row is locked (`SELECT ... FOR UPDATE`), so
//! concurrent transitions of the same order serialize instead of
//! double-moving stock; every decrement is a conditional update
//! (`stock >= quantity`), so stock can never go negative; and any failure
//! rolls the whole batch back, leaving no line item partially adjusted.

use crate::domain::fulfillment::{plan_transition, StockAdjustment, StockDirection, TransitionPlan};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Order, OrderItem, OrderStatus, ShippingInfo};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, user_id, status, shipping_address, shipping_city, shipping_state, \
                             shipping_country, shipping_postal_code, shipping_phone, payment_id, \
                             payment_status, paid_at, item_price_cents, tax_price_cents, \
                             shipping_price_cents, total_price_cents, delivered_at, created_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, name, price_cents, quantity, image_url";

// --- Checkout input ---

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
  #[serde(rename = "productId")]
  pub product_id: Uuid,
  pub name: String,
  #[serde(rename = "priceCents")]
  pub price_cents: i64,
  pub quantity: i32,
  #[serde(rename = "imageUrl")]
  pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInfo {
  pub id: String,
  pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
  #[serde(rename = "shippingInfo")]
  pub shipping_info: ShippingInfo,
  #[serde(rename = "orderItems")]
  pub order_items: Vec<NewOrderItem>,
  #[serde(rename = "paymentInfo")]
  pub payment_info: PaymentInfo,
  #[serde(rename = "itemPriceCents")]
  pub item_price_cents: i64,
  #[serde(rename = "taxPriceCents")]
  pub tax_price_cents: i64,
  #[serde(rename = "shippingPriceCents")]
  pub shipping_price_cents: i64,
  #[serde(rename = "totalPriceCents")]
  pub total_price_cents: i64,
}

impl NewOrder {
  /// Field-level validation of a checkout request. Serde already guarantees
  /// presence; this rejects blank and nonsensical values.
  pub fn validate(&self) -> AppResult<()> {
    let s = &self.shipping_info;
    let shipping_fields = [
      ("shippingInfo.address", &s.address),
      ("shippingInfo.city", &s.city),
      ("shippingInfo.state", &s.state),
      ("shippingInfo.country", &s.country),
      ("shippingInfo.postalCode", &s.postal_code),
      ("shippingInfo.phone", &s.phone),
    ];
    for (field, value) in shipping_fields {
      if value.trim().is_empty() {
        return Err(AppError::Validation(format!("Field '{}' must not be empty.", field)));
      }
    }

    if self.order_items.is_empty() {
      return Err(AppError::Validation("An order needs at least one item.".to_string()));
    }
    for (idx, item) in self.order_items.iter().enumerate() {
      if item.name.trim().is_empty() {
        return Err(AppError::Validation(format!("orderItems[{}].name must not be empty.", idx)));
      }
      if item.quantity <= 0 {
        return Err(AppError::Validation(format!(
          "orderItems[{}].quantity must be positive.",
          idx
        )));
      }
      if item.price_cents < 0 {
        return Err(AppError::Validation(format!(
          "orderItems[{}].priceCents must not be negative.",
          idx
        )));
      }
      if item.image_url.trim().is_empty() {
        return Err(AppError::Validation(format!(
          "orderItems[{}].imageUrl must not be empty.",
          idx
        )));
      }
    }

    for (field, value) in [
      ("itemPriceCents", self.item_price_cents),
      ("taxPriceCents", self.tax_price_cents),
      ("shippingPriceCents", self.shipping_price_cents),
      ("totalPriceCents", self.total_price_cents),
    ] {
      if value < 0 {
        return Err(AppError::Validation(format!("Field '{}' must not be negative.", field)));
      }
    }

    Ok(())
  }
}

// --- Read models ---

/// A single order enriched with its line items and the purchaser's identity.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  #[serde(rename = "orderItems")]
  pub items: Vec<OrderItem>,
  #[serde(rename = "userName")]
  pub user_name: String,
  #[serde(rename = "userEmail")]
  pub user_email: String,
}

#[derive(Debug)]
pub enum TransitionOutcome {
  /// Same-group transition: nothing was persisted, stored status unchanged.
  NoOp { current: OrderStatus },
  Updated { order: Order },
}

// --- Operations ---

/// Creates an order and its line-item snapshots in one transaction. Stock is
/// deliberately untouched here: inventory moves only when the order crosses
/// the fulfillment boundary.
pub async fn create(pool: &PgPool, owner_id: Uuid, new_order: &NewOrder) -> AppResult<(Order, Vec<OrderItem>)> {
  new_order.validate()?;

  let mut tx = pool.begin().await.map_err(AppError::Sqlx)?;

  let insert_order = format!(
    "INSERT INTO orders (user_id, shipping_address, shipping_city, shipping_state, shipping_country, \
     shipping_postal_code, shipping_phone, payment_id, payment_status, paid_at, item_price_cents, \
     tax_price_cents, shipping_price_cents, total_price_cents) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), $10, $11, $12, $13) RETURNING {}",
    ORDER_COLUMNS
  );
  let order: Order = sqlx::query_as::<_, Order>(&insert_order)
    .bind(owner_id)
    .bind(&new_order.shipping_info.address)
    .bind(&new_order.shipping_info.city)
    .bind(&new_order.shipping_info.state)
    .bind(&new_order.shipping_info.country)
    .bind(&new_order.shipping_info.postal_code)
    .bind(&new_order.shipping_info.phone)
    .bind(&new_order.payment_info.id)
    .bind(&new_order.payment_info.status)
    .bind(new_order.item_price_cents)
    .bind(new_order.tax_price_cents)
    .bind(new_order.shipping_price_cents)
    .bind(new_order.total_price_cents)
    .fetch_one(&mut *tx)
    .await
    .map_err(AppError::Sqlx)?;

  let insert_item = format!(
    "INSERT INTO order_items (order_id, product_id, name, price_cents, quantity, image_url) \
     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
    ITEM_COLUMNS
  );
  let mut items = Vec::with_capacity(new_order.order_items.len());
  for item in &new_order.order_items {
    let stored: OrderItem = sqlx::query_as::<_, OrderItem>(&insert_item)
      .bind(order.id)
      .bind(item.product_id)
      .bind(&item.name)
      .bind(item.price_cents)
      .bind(item.quantity)
      .bind(&item.image_url)
      .fetch_one(&mut *tx)
      .await
      .map_err(AppError::Sqlx)?;
    items.push(stored);
  }

  tx.commit().await.map_err(AppError::Sqlx)?;
  Ok((order, items))
}

/// Fetches one order with its line items and the purchasing user's
/// name/email. `Ok(None)` when the id does not resolve.
pub async fn find_detail(pool: &PgPool, order_id: Uuid) -> AppResult<Option<OrderDetail>> {
  let query = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
  let order: Option<Order> = sqlx::query_as::<_, Order>(&query)
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?;
  let Some(order) = order else {
    return Ok(None);
  };

  let items = list_items(pool, order_id).await?;

  let (user_name, user_email): (String, String) =
    sqlx::query_as("SELECT name, email FROM users WHERE id = $1")
      .bind(order.user_id)
      .fetch_optional(pool)
      .await
      .map_err(AppError::Sqlx)?
      .unwrap_or_else(|| ("[deleted user]".to_string(), String::new()));

  Ok(Some(OrderDetail {
    order,
    items,
    user_name,
    user_email,
  }))
}

pub async fn list_items(pool: &PgPool, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
  let query = format!("SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id", ITEM_COLUMNS);
  sqlx::query_as::<_, OrderItem>(&query)
    .bind(order_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Every order owned by `user_id`. An empty list is a valid result, not an
/// error.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<Order>> {
  let query = format!(
    "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    ORDER_COLUMNS
  );
  sqlx::query_as::<_, Order>(&query)
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Order>> {
  let query = format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLUMNS);
  sqlx::query_as::<_, Order>(&query)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Applies a status transition atomically.
///
/// The order row is locked for the duration of the transaction, so of two
/// concurrent identical transitions one waits, re-reads the already-updated
/// status, plans a no-op, and moves no stock a second time.
pub async fn transition_status(pool: &PgPool, order_id: Uuid, requested: OrderStatus) -> AppResult<TransitionOutcome> {
  let mut tx = pool.begin().await.map_err(AppError::Sqlx)?;

  let query = format!("SELECT {} FROM orders WHERE id = $1 FOR UPDATE", ORDER_COLUMNS);
  let order: Order = sqlx::query_as::<_, Order>(&query)
    .bind(order_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(AppError::Sqlx)?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;

  let item_query = format!("SELECT {} FROM order_items WHERE order_id = $1 ORDER BY id", ITEM_COLUMNS);
  let items: Vec<OrderItem> = sqlx::query_as::<_, OrderItem>(&item_query)
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await
    .map_err(AppError::Sqlx)?;

  match plan_transition(order.status, requested, &items) {
    TransitionPlan::NoOp => Ok(TransitionOutcome::NoOp { current: order.status }),
    TransitionPlan::Apply {
      adjustments,
      stamp_delivered_at,
    } => {
      for adjustment in &adjustments {
        // An error here drops the transaction: earlier adjustments in the
        // batch roll back with it.
        apply_adjustment(&mut tx, adjustment).await?;
      }

      let update = format!(
        "UPDATE orders SET status = $2, delivered_at = CASE WHEN $3 THEN now() ELSE delivered_at END \
         WHERE id = $1 RETURNING {}",
        ORDER_COLUMNS
      );
      let updated: Order = sqlx::query_as::<_, Order>(&update)
        .bind(order_id)
        .bind(requested)
        .bind(stamp_delivered_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Sqlx)?;

      tx.commit().await.map_err(AppError::Sqlx)?;
      Ok(TransitionOutcome::Updated { order: updated })
    }
  }
}

/// One inventory mutation for one line item, inside the caller's
/// transaction. Decrease is conditional on sufficient stock.
async fn apply_adjustment(tx: &mut Transaction<'_, Postgres>, adjustment: &StockAdjustment) -> AppResult<()> {
  match adjustment.direction {
    StockDirection::Decrease => {
      let result = sqlx::query(
        "UPDATE products SET stock = stock - $2, updated_at = now() WHERE id = $1 AND stock >= $2",
      )
      .bind(adjustment.product_id)
      .bind(adjustment.quantity)
      .execute(&mut **tx)
      .await
      .map_err(AppError::Sqlx)?;

      if result.rows_affected() == 0 {
        // Distinguish a vanished product from a genuine shortfall.
        let available: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
          .bind(adjustment.product_id)
          .fetch_optional(&mut **tx)
          .await
          .map_err(AppError::Sqlx)?;
        return match available {
          None => Err(AppError::NotFound(format!(
            "Product {} not found.",
            adjustment.product_id
          ))),
          Some(available) => Err(AppError::InsufficientStock {
            product_id: adjustment.product_id,
            available,
            requested: adjustment.quantity,
          }),
        };
      }
      Ok(())
    }
    StockDirection::Increase => {
      let result = sqlx::query("UPDATE products SET stock = stock + $2, updated_at = now() WHERE id = $1")
        .bind(adjustment.product_id)
        .bind(adjustment.quantity)
        .execute(&mut **tx)
        .await
        .map_err(AppError::Sqlx)?;

      if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
          "Product {} not found.",
          adjustment.product_id
        )));
      }
      Ok(())
    }
  }
}

/// Permanent removal. No stock reversal: deleting a shipped order does not
/// restock its line items.
pub async fn delete(pool: &PgPool, order_id: Uuid) -> AppResult<bool> {
  let result = sqlx::query("DELETE FROM orders WHERE id = $1")
    .bind(order_id)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
  Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_order() -> NewOrder {
    NewOrder {
      shipping_info: ShippingInfo {
        address: "1 Infinite Loop".into(),
        city: "Cupertino".into(),
        state: "CA".into(),
        country: "US".into(),
        postal_code: "95014".into(),
        phone: "555-0100".into(),
      },
      order_items: vec![NewOrderItem {
        product_id: Uuid::new_v4(),
        name: "Widget".into(),
        price_cents: 1999,
        quantity: 2,
        image_url: "https://img.example/widget.png".into(),
      }],
      payment_info: PaymentInfo {
        id: "pay_123".into(),
        status: "succeeded".into(),
      },
      item_price_cents: 3998,
      tax_price_cents: 400,
      shipping_price_cents: 500,
      total_price_cents: 4898,
    }
  }

  #[test]
  fn a_complete_order_passes_validation() {
    assert!(sample_order().validate().is_ok());
  }

  #[test]
  fn blank_shipping_fields_are_rejected() {
    let mut order = sample_order();
    order.shipping_info.city = "  ".into();
    assert!(matches!(order.validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn an_order_without_items_is_rejected() {
    let mut order = sample_order();
    order.order_items.clear();
    assert!(matches!(order.validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn zero_quantity_items_are_rejected() {
    let mut order = sample_order();
    order.order_items[0].quantity = 0;
    assert!(matches!(order.validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn negative_prices_are_rejected() {
    let mut order = sample_order();
    order.total_price_cents = -1;
    assert!(matches!(order.validate(), Err(AppError::Validation(_))));
  }
}
