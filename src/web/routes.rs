use actix_web::web;

use crate::web::handlers::{auth_handlers, order_handlers, product_handlers, review_handlers, user_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Wires every route under `/api/v1`. Admin routes declare the `AdminUser`
/// extractor in their handler signatures, so the role gate is fixed here at
/// startup rather than checked ad hoc inside handlers.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler))
          .route("/me", web::get().to(auth_handlers::me_handler))
          .route("/me", web::put().to(auth_handlers::update_profile_handler))
          .route("/avatar", web::put().to(auth_handlers::update_avatar_handler))
          .route("/password/update", web::put().to(auth_handlers::update_password_handler))
          .route("/password/forgot", web::post().to(auth_handlers::forgot_password_handler))
          .route("/password/reset", web::post().to(auth_handlers::reset_password_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route(
            "/{product_id}/reviews",
            web::get().to(review_handlers::list_reviews_handler),
          )
          .route(
            "/{product_id}/reviews",
            web::put().to(review_handlers::put_review_handler),
          )
          .route(
            "/{product_id}/reviews/{review_id}",
            web::delete().to(review_handlers::delete_review_handler),
          ),
      )
      .service(
        web::scope("/order")
          .route("/new", web::post().to(order_handlers::create_order_handler))
          .route("/myorder", web::get().to(order_handlers::my_orders_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/orders/all", web::get().to(order_handlers::admin_list_orders_handler))
          .route(
            "/order/{id}",
            web::put().to(order_handlers::admin_update_order_status_handler),
          )
          .route(
            "/order/{id}",
            web::delete().to(order_handlers::admin_delete_order_handler),
          )
          .route(
            "/product/new",
            web::post().to(product_handlers::admin_create_product_handler),
          )
          .route(
            "/product/{id}",
            web::put().to(product_handlers::admin_update_product_handler),
          )
          .route(
            "/product/{id}",
            web::delete().to(product_handlers::admin_delete_product_handler),
          )
          .route("/users", web::get().to(user_handlers::admin_list_users_handler))
          .route("/user/{id}", web::get().to(user_handlers::admin_get_user_handler))
          .route("/user/{id}", web::put().to(user_handlers::admin_update_role_handler))
          .route("/user/{id}", web::delete().to(user_handlers::admin_delete_user_handler)),
      ),
  );
}
