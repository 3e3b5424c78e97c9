// apps/storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, category_handlers, chat_handlers, product_handlers, user_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Malformed bodies and query strings answer with the same `{error}` shape as everything else.
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()));

  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/users")
          .route("/register", web::post().to(user_handlers::register_handler))
          .route("/login", web::post().to(user_handlers::login_handler))
          .route("", web::get().to(user_handlers::list_users_handler))
          .route("", web::post().to(user_handlers::create_user_handler))
          .route("/{id}", web::get().to(user_handlers::get_user_handler))
          .route("/{id}", web::put().to(user_handlers::update_user_handler))
          .route("/{id}", web::delete().to(user_handlers::delete_user_handler)),
      )
      .service(
        web::scope("/categories")
          .route("", web::get().to(category_handlers::list_categories_handler))
          .route("", web::post().to(category_handlers::create_category_handler))
          .route("/{id}", web::get().to(category_handlers::get_category_handler))
          .route("/{id}", web::put().to(category_handlers::update_category_handler))
          .route("/{id}", web::delete().to(category_handlers::delete_category_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          // Before "/{id}" so "mine" is not taken for an id.
          .route("/mine", web::get().to(product_handlers::my_products_handler))
          .route("/{id}", web::get().to(product_handlers::get_product_handler))
          .route("/{id}", web::put().to(product_handlers::update_product_handler))
          .route("/{id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/user/{userId}", web::get().to(cart_handlers::get_cart_handler))
          .route("/update-quantity", web::put().to(cart_handlers::update_quantity_handler))
          .route("/remove", web::delete().to(cart_handlers::remove_item_handler)),
      )
      .service(web::scope("/chat").route("/stream", web::post().to(chat_handlers::chat_stream_handler))),
  );
}
