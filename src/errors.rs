use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Application-wide error taxonomy.
///
/// Every failure a handler can produce maps onto exactly one HTTP status:
/// 401 unauthenticated, 403 forbidden, 404 not-found, 409 stock/state
/// conflicts, 422 validation, 502 upstream collaborator, 500 everything else.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Authentication failed: {0}")]
  Unauthenticated(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource not found: {0}")]
  NotFound(String),

  /// A stock decrement would drive a product's inventory negative.
  #[error("Insufficient stock for product {product_id}: have {available}, need {requested}")]
  InsufficientStock {
    product_id: uuid::Uuid,
    available: i32,
    requested: i32,
  },

  /// A uniqueness constraint rejected the write, e.g. registering an email
  /// that already has an account.
  #[error("Conflict: {0}")]
  Conflict(String),

  /// Image store or mail relay failure, with the original cause preserved.
  #[error("Upstream service error: {source}")]
  Upstream {
    #[source]
    source: anyhow::Error,
  },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal server error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

fn fail(message: impl Into<String>) -> serde_json::Value {
  json!({ "success": false, "message": message.into() })
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::UnprocessableEntity().json(fail(m.clone())),
      AppError::Unauthenticated(m) => HttpResponse::Unauthorized().json(fail(m.clone())),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(fail(m.clone())),
      AppError::NotFound(m) => HttpResponse::NotFound().json(fail(m.clone())),
      AppError::InsufficientStock { .. } => HttpResponse::Conflict().json(fail(self.to_string())),
      AppError::Conflict(m) => HttpResponse::Conflict().json(fail(m.clone())),
      AppError::Upstream { .. } => HttpResponse::BadGateway().json(fail("Upstream service error")),
      AppError::Config(_) => HttpResponse::InternalServerError().json(fail("Configuration issue")),
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(fail("Database operation failed")),
      AppError::Internal(_) => HttpResponse::InternalServerError().json(fail("An internal error occurred")),
    }
  }
}

/// Result alias used throughout the application.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::http::StatusCode;

  #[test]
  fn status_codes_follow_the_standard_mapping() {
    let cases: Vec<(AppError, StatusCode)> = vec![
      (AppError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
      (AppError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
      (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
      (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
      (
        AppError::InsufficientStock {
          product_id: uuid::Uuid::nil(),
          available: 2,
          requested: 5,
        },
        StatusCode::CONFLICT,
      ),
      (AppError::Conflict("x".into()), StatusCode::CONFLICT),
      (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, expected) in cases {
      assert_eq!(err.error_response().status(), expected, "for {err}");
    }
  }

  #[test]
  fn error_body_carries_the_failure_envelope() {
    let resp = AppError::NotFound("Order abc not found".into()).error_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
