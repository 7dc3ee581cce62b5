//! Signed session tokens carried in the HTTP-only session cookie.

use crate::errors::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
  /// Subject: the user id.
  pub sub: String,
  /// Expiry (unix timestamp).
  pub exp: i64,
  /// Issued at (unix timestamp).
  pub iat: i64,
}

/// Issues an HS256 session token for `user_id`, valid for `ttl_days`.
pub fn issue_session_token(user_id: Uuid, secret: &str, ttl_days: i64) -> Result<String, AppError> {
  let now = Utc::now();
  let claims = SessionClaims {
    sub: user_id.to_string(),
    exp: (now + Duration::days(ttl_days)).timestamp(),
    iat: now.timestamp(),
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

/// Verifies signature and expiry and returns the subject user id.
///
/// Any defect in the token (bad signature, expired, malformed subject) is an
/// authentication failure; verification is terminal for the request.
pub fn verify_session_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
  let data = decode::<SessionClaims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::default(),
  )
  .map_err(|e| AppError::Unauthenticated(format!("Invalid session token: {}", e)))?;

  Uuid::parse_str(&data.claims.sub)
    .map_err(|_| AppError::Unauthenticated("Session token carries no valid subject id.".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "test-secret";

  #[test]
  fn issued_token_verifies_to_the_same_user() {
    let user_id = Uuid::new_v4();
    let token = issue_session_token(user_id, SECRET, 7).unwrap();
    assert_eq!(verify_session_token(&token, SECRET).unwrap(), user_id);
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let token = issue_session_token(Uuid::new_v4(), SECRET, 7).unwrap();
    assert!(matches!(
      verify_session_token(&token, "other-secret"),
      Err(AppError::Unauthenticated(_))
    ));
  }

  #[test]
  fn expired_token_is_rejected() {
    // Negative TTL puts the expiry in the past.
    let token = issue_session_token(Uuid::new_v4(), SECRET, -1).unwrap();
    assert!(matches!(
      verify_session_token(&token, SECRET),
      Err(AppError::Unauthenticated(_))
    ));
  }

  #[test]
  fn garbage_token_is_rejected() {
    assert!(matches!(
      verify_session_token("not.a.jwt", SECRET),
      Err(AppError::Unauthenticated(_))
    ));
  }
}
