//! Request guards.
//!
//! `AuthenticatedUser` is the authentication guard: it verifies the signed
//! session cookie and loads the acting user. `AdminUser` layers the role
//! gate on top; admin-only routes declare it in their handler signature, so
//! the allowed-role set is fixed per route at startup and the gate runs
//! strictly after authentication by construction.

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::db;
use crate::domain::is_authorized;
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::services::token_service;
use crate::state::AppState;

#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user: User,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState is not configured.".to_string()))?
        .clone();

      let cookie = req.cookie(&state.config.session_cookie_name).ok_or_else(|| {
        warn!("Authentication guard: session cookie absent.");
        AppError::Unauthenticated("Please log in to access this resource.".to_string())
      })?;

      let user_id = token_service::verify_session_token(cookie.value(), &state.config.jwt_secret)?;

      // A valid token whose subject no longer exists (e.g. account deleted
      // after issue) is a 404, not a 401.
      let user = db::users::find_by_id(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} no longer exists.", user_id)))?;

      Ok(AuthenticatedUser { user })
    })
  }
}

/// Role gate over an already-authenticated user.
#[derive(Debug)]
pub struct AdminUser(pub User);

const ADMIN_ONLY: &[Role] = &[Role::Admin];

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let authenticated = AuthenticatedUser::extract(&req).await?;
      if !is_authorized(authenticated.user.role, ADMIN_ONLY) {
        warn!(role = %authenticated.user.role, "Role gate rejected request.");
        return Err(AppError::Forbidden(format!(
          "Role '{}' is not allowed to access this resource.",
          authenticated.user.role
        )));
      }
      Ok(AdminUser(authenticated.user))
    })
  }
}
