use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{created, success};
use crate::db::orders::{self, NewOrder, TransitionOutcome};
use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};

/// Subject and body for the checkout confirmation mail.
fn order_confirmation_email(recipient_name: &str, order_id: Uuid, total_price_cents: i64) -> (String, String) {
  let subject = format!("Your ShopNest order {} is confirmed!", order_id);
  let body = format!(
    "<p>Hi {},</p><p>Your order <b>{}</b> for ${}.{:02} has been placed.</p>\
     <p>Thank you for shopping with us!</p>",
    recipient_name,
    order_id,
    total_price_cents / 100,
    total_price_cents % 100
  );
  (subject, body)
}

// Guard extractors are declared ahead of the JSON payload in every handler
// below: actix polls extractors in argument order, and authentication must
// reject before any body parsing happens.
#[instrument(
  name = "handler::create_order",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user.id)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
  let (order, items) = orders::create(&app_state.db_pool, auth_user.user.id, &payload).await?;
  info!("Order {} created with {} line item(s).", order.id, items.len());

  // Fire-and-forget: a lost confirmation mail must not fail the checkout.
  let (subject, body) = order_confirmation_email(&auth_user.user.name, order.id, order.total_price_cents);
  if let Err(e) = app_state
    .mailer
    .send(&auth_user.user.email, &app_state.config.mail_sender, &subject, &body)
    .await
  {
    warn!(error = %e, "Failed to send confirmation mail for order {}.", order.id);
  }

  Ok(created(
    "Order created successfully.",
    json!({ "order": order, "orderItems": items }),
  ))
}

#[instrument(
  name = "handler::my_orders",
  skip(app_state, auth_user),
  fields(user_id = %auth_user.user.id)
)]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  // An empty list is a perfectly valid result for a new customer.
  let orders = orders::list_for_user(&app_state.db_pool, auth_user.user.id).await?;
  info!("Fetched {} order(s) for user {}.", orders.len(), auth_user.user.id);
  Ok(success("Orders fetched successfully.", orders))
}

#[instrument(
  name = "handler::get_order",
  skip(app_state, auth_user, path),
  fields(order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let detail = orders::find_detail(&app_state.db_pool, order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_id)))?;
  Ok(success("Order fetched successfully.", detail))
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, _admin))]
pub async fn admin_list_orders_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let orders = orders::list_all(&app_state.db_pool).await?;
  info!("Admin fetched {} order(s).", orders.len());
  Ok(success("Orders fetched successfully.", orders))
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
}

#[instrument(
  name = "handler::admin_update_order_status",
  skip(app_state, _admin, path, payload),
  fields(order_id = %path.as_ref(), requested = %payload.status)
)]
pub async fn admin_update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
  payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let requested: OrderStatus = payload
    .status
    .parse()
    .map_err(|e: String| AppError::Validation(e))?;

  match orders::transition_status(&app_state.db_pool, order_id, requested).await? {
    TransitionOutcome::NoOp { current } => {
      info!(
        "Order {} transition {} -> {} does not cross the fulfillment boundary; nothing changed.",
        order_id, current, requested
      );
      Ok(success(
        &format!(
          "Transition {} -> {} has no inventory effect; order status left unchanged.",
          current, requested
        ),
        json!({ "status": current }),
      ))
    }
    TransitionOutcome::Updated { order } => {
      info!("Order {} transitioned to {}.", order_id, order.status);
      Ok(success("Order status updated successfully.", json!({ "status": order.status })))
    }
  }
}

#[instrument(
  name = "handler::admin_delete_order",
  skip(app_state, _admin, path),
  fields(order_id = %path.as_ref())
)]
pub async fn admin_delete_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  // Deliberately no stock reversal here, even for shipped orders.
  if !orders::delete(&app_state.db_pool, order_id).await? {
    warn!("Attempted to delete nonexistent order {}.", order_id);
    return Err(AppError::NotFound(format!("Order {} not found.", order_id)));
  }
  Ok(success("Order deleted successfully.", json!({})))
}
