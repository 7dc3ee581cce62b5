//! Admin back-office user management.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::success;
use crate::db;
use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[instrument(name = "handler::admin_list_users", skip(app_state, _admin))]
pub async fn admin_list_users_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let users = db::users::list(&app_state.db_pool).await?;
  Ok(success("Users fetched successfully.", users))
}

#[instrument(name = "handler::admin_get_user", skip(app_state, _admin, path), fields(user_id = %path.as_ref()))]
pub async fn admin_get_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let user = db::users::find_by_id(&app_state.db_pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found.", user_id)))?;
  Ok(success("User fetched successfully.", user))
}

#[derive(Deserialize, Debug)]
pub struct UpdateRolePayload {
  pub role: String,
}

#[instrument(
  name = "handler::admin_update_role",
  skip(app_state, _admin, path, payload),
  fields(user_id = %path.as_ref(), role = %payload.role)
)]
pub async fn admin_update_role_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  // Role gate ahead of the JSON payload: extractors poll in argument order.
  _admin: AdminUser,
  payload: web::Json<UpdateRolePayload>,
) -> Result<HttpResponse, AppError> {
  let role: Role = payload.role.parse().map_err(|e: String| AppError::Validation(e))?;
  let user_id = path.into_inner();

  let user = db::users::update_role(&app_state.db_pool, user_id, role)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found.", user_id)))?;

  info!("User {} role changed to {}.", user_id, role);
  Ok(success("User role updated successfully.", user))
}

#[instrument(
  name = "handler::admin_delete_user",
  skip(app_state, _admin, path),
  fields(user_id = %path.as_ref())
)]
pub async fn admin_delete_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  let deleted = db::users::delete(&app_state.db_pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found.", user_id)))?;

  // Exactly one image-host delete per stored image reference.
  if let Some(public_id) = &deleted.avatar_public_id {
    if let Err(e) = app_state.image_store.delete(public_id).await {
      warn!(error = %e, "Failed to delete avatar '{}' for removed user {}.", public_id, user_id);
    }
  }

  info!("User {} deleted.", user_id);
  Ok(success("User deleted successfully.", json!({})))
}
