use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{created, success};
use crate::db::products::{self, ProductFilter};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub keyword: Option<String>,
  pub category: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ProductPayload {
  pub name: String,
  pub description: Option<String>,
  #[serde(rename = "priceCents")]
  pub price_cents: i64,
  pub category: String,
  pub stock: i32,
  /// Base64 image payloads to push to the image host (create only).
  #[serde(default)]
  pub images: Vec<String>,
}

fn validate_product(payload: &ProductPayload) -> Result<(), AppError> {
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Field 'name' must not be empty.".to_string()));
  }
  if payload.category.trim().is_empty() {
    return Err(AppError::Validation("Field 'category' must not be empty.".to_string()));
  }
  if payload.price_cents < 0 {
    return Err(AppError::Validation("Field 'priceCents' must not be negative.".to_string()));
  }
  if payload.stock < 0 {
    return Err(AppError::Validation("Field 'stock' must not be negative.".to_string()));
  }
  Ok(())
}

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let filter = ProductFilter {
    keyword: query.keyword.clone(),
    category: query.category.clone(),
  };
  let products = products::list(&app_state.db_pool, &filter).await?;
  info!("Fetched {} product(s).", products.len());
  Ok(success("Products fetched successfully.", products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = products::find(&app_state.db_pool, product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))?;
  let images = products::list_images(&app_state.db_pool, product_id).await?;
  Ok(success(
    "Product fetched successfully.",
    json!({ "product": product, "images": images }),
  ))
}

// The role gate is declared ahead of the JSON payload: actix polls
// extractors in argument order, and the guard must reject before any body
// parsing happens.
#[instrument(
  name = "handler::admin_create_product",
  skip(app_state, admin, payload),
  fields(admin_id = %admin.0.id)
)]
pub async fn admin_create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  validate_product(&payload)?;

  let product = products::insert(
    &app_state.db_pool,
    payload.name.trim(),
    payload.description.as_deref(),
    payload.price_cents,
    payload.category.trim(),
    payload.stock,
    admin.0.id,
  )
  .await?;

  let mut images = Vec::with_capacity(payload.images.len());
  for data in &payload.images {
    let stored = app_state.image_store.upload("products", data).await?;
    let image = products::insert_image(&app_state.db_pool, product.id, &stored.public_id, &stored.url).await?;
    images.push(image);
  }

  info!("Product {} created with {} image(s).", product.id, images.len());
  Ok(created(
    "Product created successfully.",
    json!({ "product": product, "images": images }),
  ))
}

#[instrument(
  name = "handler::admin_update_product",
  skip(app_state, _admin, payload, path),
  fields(product_id = %path.as_ref())
)]
pub async fn admin_update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
  payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  validate_product(&payload)?;

  let product_id = path.into_inner();
  let product = products::update(
    &app_state.db_pool,
    product_id,
    payload.name.trim(),
    payload.description.as_deref(),
    payload.price_cents,
    payload.category.trim(),
    payload.stock,
  )
  .await?
  .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))?;

  Ok(success("Product updated successfully.", product))
}

#[instrument(
  name = "handler::admin_delete_product",
  skip(app_state, _admin, path),
  fields(product_id = %path.as_ref())
)]
pub async fn admin_delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let images = products::delete(&app_state.db_pool, product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))?;

  // One delete call per stored image reference. Order line-item snapshots
  // keep their copied image URLs regardless.
  for image in &images {
    if let Err(e) = app_state.image_store.delete(&image.public_id).await {
      warn!(error = %e, "Failed to delete product image '{}'.", image.public_id);
    }
  }

  info!("Product {} deleted ({} image(s) released).", product_id, images.len());
  Ok(success("Product deleted successfully.", json!({})))
}
