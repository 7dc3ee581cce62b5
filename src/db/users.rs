use crate::errors::{AppError, Result as AppResult};
use crate::models::{Role, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, avatar_public_id, avatar_url, \
                            reset_token, reset_token_expires_at, created_at, updated_at";

pub async fn insert(pool: &PgPool, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
  let query = format!(
    "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
    USER_COLUMNS
  );
  sqlx::query_as::<_, User>(&query)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
      sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
        AppError::Conflict(format!("Email '{}' is already registered.", email))
      }
      _ => AppError::Sqlx(e),
    })
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
  let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
  sqlx::query_as::<_, User>(&query)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
  let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
  sqlx::query_as::<_, User>(&query)
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn list(pool: &PgPool) -> AppResult<Vec<User>> {
  let query = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
  sqlx::query_as::<_, User>(&query)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn update_profile(pool: &PgPool, id: Uuid, name: &str, email: &str) -> AppResult<Option<User>> {
  let query = format!(
    "UPDATE users SET name = $2, email = $3, updated_at = now() WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  );
  sqlx::query_as::<_, User>(&query)
    .bind(id)
    .bind(name)
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> AppResult<()> {
  sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
  Ok(())
}

pub async fn update_avatar(pool: &PgPool, id: Uuid, public_id: &str, url: &str) -> AppResult<()> {
  sqlx::query("UPDATE users SET avatar_public_id = $2, avatar_url = $3, updated_at = now() WHERE id = $1")
    .bind(id)
    .bind(public_id)
    .bind(url)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
  Ok(())
}

pub async fn set_reset_token(
  pool: &PgPool,
  id: Uuid,
  token: &str,
  expires_at: DateTime<Utc>,
) -> AppResult<()> {
  sqlx::query("UPDATE users SET reset_token = $2, reset_token_expires_at = $3, updated_at = now() WHERE id = $1")
    .bind(id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
  Ok(())
}

/// Finds the user holding an unexpired reset token.
pub async fn find_by_reset_token(pool: &PgPool, token: &str) -> AppResult<Option<User>> {
  let query = format!(
    "SELECT {} FROM users WHERE reset_token = $1 AND reset_token_expires_at > now()",
    USER_COLUMNS
  );
  sqlx::query_as::<_, User>(&query)
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Installs the new password hash and burns the reset token in one atomic
/// statement, so a crash can never leave a usable token next to the new hash.
pub async fn complete_password_reset(pool: &PgPool, id: Uuid, password_hash: &str) -> AppResult<()> {
  sqlx::query(
    "UPDATE users SET password_hash = $2, reset_token = NULL, reset_token_expires_at = NULL, \
     updated_at = now() WHERE id = $1",
  )
  .bind(id)
  .bind(password_hash)
  .execute(pool)
  .await
  .map_err(AppError::Sqlx)?;
  Ok(())
}

pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> AppResult<()> {
  sqlx::query("UPDATE users SET reset_token = NULL, reset_token_expires_at = NULL, updated_at = now() WHERE id = $1")
    .bind(id)
    .execute(pool)
    .await
    .map_err(AppError::Sqlx)?;
  Ok(())
}

pub async fn update_role(pool: &PgPool, id: Uuid, role: Role) -> AppResult<Option<User>> {
  let query = format!(
    "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {}",
    USER_COLUMNS
  );
  sqlx::query_as::<_, User>(&query)
    .bind(id)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// Removes the user row. Returns the deleted user so the caller can release
/// external resources (avatar image) after the row is gone.
pub async fn delete(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
  let query = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
  sqlx::query_as::<_, User>(&query)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}
