use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::success;
use crate::db;
use crate::errors::AppError;
use crate::services::{auth_service, token_service};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProfilePayload {
  pub name: String,
  pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdatePasswordPayload {
  #[serde(rename = "oldPassword")]
  pub old_password: String,
  #[serde(rename = "newPassword")]
  pub new_password: String,
}

#[derive(Deserialize, Debug)]
pub struct ForgotPasswordPayload {
  pub email: String,
}

#[derive(Deserialize, Debug)]
pub struct ResetPasswordPayload {
  pub token: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct AvatarPayload {
  /// Base64 image payload (or URL) forwarded to the image host.
  pub image: String,
}

fn session_cookie(state: &AppState, user_id: Uuid) -> Result<Cookie<'static>, AppError> {
  let token = token_service::issue_session_token(user_id, &state.config.jwt_secret, state.config.session_ttl_days)?;
  Ok(
    Cookie::build(state.config.session_cookie_name.clone(), token)
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .max_age(CookieDuration::days(state.config.session_ttl_days))
      .finish(),
  )
}

// --- Handlers ---

#[instrument(name = "handler::register", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Field 'name' must not be empty.".to_string()));
  }
  if !payload.email.contains('@') {
    return Err(AppError::Validation("Field 'email' must be a valid address.".to_string()));
  }

  let password_hash = auth_service::hash_password(&payload.password)?;
  let user = db::users::insert(&app_state.db_pool, payload.name.trim(), &payload.email, &password_hash).await?;
  info!("User {} registered.", user.id);

  let cookie = session_cookie(&app_state, user.id)?;
  Ok(
    HttpResponse::Created()
      .cookie(cookie)
      .json(json!({ "success": true, "message": "User registered successfully.", "data": user })),
  )
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let user = db::users::find_by_email(&app_state.db_pool, &payload.email)
    .await?
    .ok_or_else(|| AppError::Unauthenticated("Invalid email or password.".to_string()))?;

  if !auth_service::verify_password(&user.password_hash, &payload.password)? {
    warn!("Failed login attempt for {}.", payload.email);
    return Err(AppError::Unauthenticated("Invalid email or password.".to_string()));
  }

  info!("User {} logged in.", user.id);
  let cookie = session_cookie(&app_state, user.id)?;
  Ok(
    HttpResponse::Ok()
      .cookie(cookie)
      .json(json!({ "success": true, "message": "Login successful.", "data": user })),
  )
}

#[instrument(name = "handler::logout", skip(app_state))]
pub async fn logout_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let mut cookie = Cookie::build(app_state.config.session_cookie_name.clone(), "")
    .path("/")
    .http_only(true)
    .finish();
  cookie.make_removal();
  Ok(
    HttpResponse::Ok()
      .cookie(cookie)
      .json(json!({ "success": true, "message": "Logged out.", "data": json!({}) })),
  )
}

#[instrument(name = "handler::me", skip(auth_user), fields(user_id = %auth_user.user.id))]
pub async fn me_handler(auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(success("Profile fetched successfully.", auth_user.user))
}

// The auth guard is declared ahead of the JSON payload in the handlers
// below: actix polls extractors in argument order, and authentication must
// reject before any body parsing happens.
#[instrument(
  name = "handler::update_profile",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user.id)
)]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<UpdateProfilePayload>,
) -> Result<HttpResponse, AppError> {
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Field 'name' must not be empty.".to_string()));
  }
  if !payload.email.contains('@') {
    return Err(AppError::Validation("Field 'email' must be a valid address.".to_string()));
  }

  let user = db::users::update_profile(&app_state.db_pool, auth_user.user.id, payload.name.trim(), &payload.email)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} no longer exists.", auth_user.user.id)))?;
  Ok(success("Profile updated successfully.", user))
}

#[instrument(
  name = "handler::update_password",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user.id)
)]
pub async fn update_password_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<UpdatePasswordPayload>,
) -> Result<HttpResponse, AppError> {
  if !auth_service::verify_password(&auth_user.user.password_hash, &payload.old_password)? {
    return Err(AppError::Unauthenticated("Old password is incorrect.".to_string()));
  }

  let new_hash = auth_service::hash_password(&payload.new_password)?;
  db::users::update_password(&app_state.db_pool, auth_user.user.id, &new_hash).await?;
  info!("User {} changed their password.", auth_user.user.id);
  Ok(success("Password updated successfully.", json!({})))
}

#[instrument(
  name = "handler::update_avatar",
  skip(app_state, auth_user, payload),
  fields(user_id = %auth_user.user.id)
)]
pub async fn update_avatar_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<AvatarPayload>,
) -> Result<HttpResponse, AppError> {
  // Replace at the image host first; only then swap the stored reference.
  let stored = app_state.image_store.upload("avatars", &payload.image).await?;

  if let Some(old_public_id) = &auth_user.user.avatar_public_id {
    if let Err(e) = app_state.image_store.delete(old_public_id).await {
      // The new avatar is already live; losing the orphan is the lesser evil.
      warn!(error = %e, "Failed to delete previous avatar '{}'.", old_public_id);
    }
  }

  db::users::update_avatar(&app_state.db_pool, auth_user.user.id, &stored.public_id, &stored.url).await?;
  Ok(success(
    "Avatar updated successfully.",
    json!({ "publicId": stored.public_id, "url": stored.url }),
  ))
}

#[instrument(name = "handler::forgot_password", skip(app_state, payload), fields(email = %payload.email))]
pub async fn forgot_password_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ForgotPasswordPayload>,
) -> Result<HttpResponse, AppError> {
  let user = db::users::find_by_email(&app_state.db_pool, &payload.email)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No account for email '{}'.", payload.email)))?;

  let token = Uuid::new_v4().simple().to_string();
  let expires_at = Utc::now() + Duration::minutes(app_state.config.reset_token_ttl_minutes);
  db::users::set_reset_token(&app_state.db_pool, user.id, &token, expires_at).await?;

  let body = format!(
    "<p>Hi {},</p><p>Your password reset token is <b>{}</b>. It expires in {} minutes.</p>\
     <p>If you did not request this, ignore this mail.</p>",
    user.name, token, app_state.config.reset_token_ttl_minutes
  );
  if let Err(e) = app_state
    .mailer
    .send(&user.email, &app_state.config.mail_sender, "ShopNest password reset", &body)
    .await
  {
    // The token is useless if the user never receives it; undo and report.
    db::users::clear_reset_token(&app_state.db_pool, user.id).await?;
    return Err(e);
  }

  info!("Password reset token issued for user {}.", user.id);
  Ok(success(
    &format!("Password reset email sent to {}.", user.email),
    json!({}),
  ))
}

#[instrument(name = "handler::reset_password", skip(app_state, payload))]
pub async fn reset_password_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ResetPasswordPayload>,
) -> Result<HttpResponse, AppError> {
  let user = db::users::find_by_reset_token(&app_state.db_pool, &payload.token)
    .await?
    .ok_or_else(|| AppError::Unauthenticated("Reset token is invalid or has expired.".to_string()))?;

  let new_hash = auth_service::hash_password(&payload.password)?;
  db::users::complete_password_reset(&app_state.db_pool, user.id, &new_hash).await?;

  info!("Password reset completed for user {}.", user.id);
  Ok(success("Password has been reset. Please log in.", json!({})))
}
