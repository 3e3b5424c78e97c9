// apps/storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use storeflow::ContextData;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{CartLookup, CartView};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::payloads::{CartLineQuery, CartRemoveQuery};

fn cart_not_found() -> AppError {
  AppError::NotFound("Cart not found".to_string())
}

fn found_or_not_found(lookup: CartLookup, product_id: i32) -> Result<CartView, AppError> {
  match lookup {
    CartLookup::Found(cart) => Ok(cart),
    CartLookup::NoCart => Err(cart_not_found()),
    CartLookup::NoLine => Err(AppError::NotFound(format!("Product {} is not in the cart.", product_id))),
  }
}

#[instrument(
  name = "handler::add_to_cart",
  skip(auth_user, app_state, query),
  fields(user_id = query.user_id, product_id = query.product_id, quantity = query.quantity)
)]
pub async fn add_to_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  query: web::Query<CartLineQuery>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_self_or_admin(query.user_id)?;

  let ctx_data = ContextData::new(AddToCartCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: query.user_id,
    product_id: query.product_id,
    quantity: query.quantity,
    cart: None,
  });

  run_to_completion(&app_state.flows, ctx_data.clone()).await?;

  let cart = ctx_data.read().cart.clone().ok_or_else(|| {
    warn!("Add to Cart pipeline completed but the cart was not set.");
    AppError::Internal("Add to cart completed without a cart.".to_string())
  })?;
  info!(cart_id = cart.id, "Item added to cart.");
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "handler::get_cart", skip(auth_user, app_state, path), fields(user_id = %path.as_ref()))]
pub async fn get_cart_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  auth_user.require_self_or_admin(user_id)?;

  let cart = app_state.repos.carts.find_by_user(user_id).await?.ok_or_else(cart_not_found)?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::update_cart_quantity",
  skip(auth_user, app_state, query),
  fields(user_id = query.user_id, product_id = query.product_id, quantity = query.quantity)
)]
pub async fn update_quantity_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  query: web::Query<CartLineQuery>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_self_or_admin(query.user_id)?;
  if query.quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }

  let lookup = app_state
    .repos
    .carts
    .set_quantity(query.user_id, query.product_id, query.quantity)
    .await?;
  let cart = found_or_not_found(lookup, query.product_id)?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(auth_user, app_state, query),
  fields(user_id = query.user_id, product_id = query.product_id)
)]
pub async fn remove_item_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  query: web::Query<CartRemoveQuery>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_self_or_admin(query.user_id)?;

  let lookup = app_state.repos.carts.remove_item(query.user_id, query.product_id).await?;
  let cart = found_or_not_found(lookup, query.product_id)?;
  info!(cart_id = cart.id, "Item removed from cart.");
  Ok(HttpResponse::Ok().json(cart))
}
