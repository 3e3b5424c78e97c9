// apps/storefront/src/pipelines/cart_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::AddToCartCtxData;
use storeflow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{info, instrument, warn};

pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(vec![
    StepDef::new("validate_quantity"),
    StepDef::new("ensure_product_exists"),
    StepDef::new("upsert_cart_line"),
  ]);

  p.on("validate_quantity", |ctx_data: ContextData<AddToCartCtxData>| async move {
    let quantity = ctx_data.read().quantity;
    if quantity < 1 {
      warn!(quantity, "Rejected non-positive cart quantity.");
      return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p.on("ensure_product_exists", ensure_product_exists);
  p.on("upsert_cart_line", upsert_cart_line);

  registry.register(p);
  info!("Add to Cart pipeline registered.");
}

async fn ensure_product_exists(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let (product_id, products) = {
    let guard = ctx_data.read();
    (guard.product_id, guard.app_state.repos.products.clone())
  };

  if products.find(product_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart::upsert_cart_line", skip(ctx_data))]
async fn upsert_cart_line(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<PipelineControl> {
  let (user_id, product_id, quantity, carts) = {
    let guard = ctx_data.read();
    (
      guard.user_id,
      guard.product_id,
      guard.quantity,
      guard.app_state.repos.carts.clone(),
    )
  };

  let cart = carts.add_item(user_id, product_id, quantity).await?;
  info!(
    user_id,
    product_id,
    cart_id = cart.id,
    lines = cart.cart_items.len(),
    "Cart line added or merged."
  );
  ctx_data.write().cart = Some(cart);
  Ok(PipelineControl::Continue)
}
