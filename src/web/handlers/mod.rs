pub mod auth_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod review_handlers;
pub mod user_handlers;

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

/// Success envelope shared by every handler: `{success, message, data}`.
pub fn success(message: &str, data: impl Serialize) -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "success": true,
    "message": message,
    "data": data,
  }))
}

/// Like [`success`] but with a 201 status, for resource creation.
pub fn created(message: &str, data: impl Serialize) -> HttpResponse {
  HttpResponse::Created().json(json!({
    "success": true,
    "message": message,
    "data": data,
  }))
}
