//! Password hashing and verification.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing failed: {}", e))
    })?;
  Ok(hash.to_string())
}

/// Verifies a plain-text password against a stored Argon2 hash string.
///
/// Returns `Ok(false)` on a mismatch; an unparsable stored hash is an
/// internal error, not an authentication failure.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if stored_hash.is_empty() || provided_password.is_empty() {
    return Ok(false);
  }

  let parsed = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Failed to parse stored password hash.");
    AppError::Internal(format!("Invalid stored password hash: {}", e))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(e) => {
      error!(error = %e, "Argon2 verification errored.");
      Err(AppError::Internal(format!("Password verification failed: {}", e)))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_and_verify_round_trip() {
    let hash = hash_password("hunter2!").unwrap();
    assert!(verify_password(&hash, "hunter2!").unwrap());
    assert!(!verify_password(&hash, "hunter3!").unwrap());
  }

  #[test]
  fn empty_password_is_rejected_at_hash_time() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn two_hashes_of_one_password_differ_by_salt() {
    let a = hash_password("same").unwrap();
    let b = hash_password("same").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn garbage_stored_hash_is_an_internal_error() {
    assert!(matches!(
      verify_password("not-a-phc-string", "pw"),
      Err(AppError::Internal(_))
    ));
  }
}
