use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::success;
use crate::db::products;
use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ReviewPayload {
  pub rating: i32,
  pub comment: String,
}

#[instrument(name = "handler::list_reviews", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  if products::find(&app_state.db_pool, product_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Product {} not found.", product_id)));
  }
  let reviews = products::list_reviews(&app_state.db_pool, product_id).await?;
  Ok(success("Reviews fetched successfully.", reviews))
}

// Auth guard ahead of the JSON payload: extractors poll in argument order.
#[instrument(
  name = "handler::put_review",
  skip(app_state, path, auth_user, payload),
  fields(product_id = %path.as_ref(), user_id = %auth_user.user.id)
)]
pub async fn put_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
  payload: web::Json<ReviewPayload>,
) -> Result<HttpResponse, AppError> {
  if !(1..=5).contains(&payload.rating) {
    return Err(AppError::Validation("Field 'rating' must be between 1 and 5.".to_string()));
  }

  let product_id = path.into_inner();
  if products::find(&app_state.db_pool, product_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Product {} not found.", product_id)));
  }

  let aggregate = products::upsert_review(
    &app_state.db_pool,
    product_id,
    auth_user.user.id,
    &auth_user.user.name,
    payload.rating,
    &payload.comment,
  )
  .await?;

  info!(
    "Review stored for product {}; aggregate is now {} review(s), rating {:.2}.",
    product_id, aggregate.count, aggregate.average_rating
  );
  Ok(success(
    "Review saved successfully.",
    json!({ "numberOfReviews": aggregate.count, "rating": aggregate.average_rating }),
  ))
}

#[instrument(
  name = "handler::delete_review",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user.id)
)]
pub async fn delete_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let (product_id, review_id) = path.into_inner();

  let review = products::find_review(&app_state.db_pool, product_id, review_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review {} not found.", review_id)))?;

  // Owners may remove their own review; admins may remove any.
  if review.user_id != auth_user.user.id && auth_user.user.role != Role::Admin {
    return Err(AppError::Forbidden(
      "Only the reviewer or an admin may delete a review.".to_string(),
    ));
  }

  let aggregate = products::delete_review(&app_state.db_pool, product_id, review_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review {} not found.", review_id)))?;

  Ok(success(
    "Review deleted successfully.",
    json!({ "numberOfReviews": aggregate.count, "rating": aggregate.average_rating }),
  ))
}
