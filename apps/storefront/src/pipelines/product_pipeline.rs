// apps/storefront/src/pipelines/product_pipeline.rs

//! Create, update and delete of products. Updates and deletes load the
//! product first so ownership can be checked before anything changes.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{ProductDraft, Role};
use crate::pipelines::common_steps::{normalize_price, required_text, PRODUCT_NAME_MAX_CHARS};
use crate::pipelines::contexts::{ProductWriteCtxData, WriteOp};
use crate::services::category_cache;
use storeflow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{info, instrument, warn};

pub fn register_product_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<ProductWriteCtxData, AppError>::new(vec![
    StepDef::new("load_existing").skip_if(|d: &ProductWriteCtxData| d.op.is_create()),
    StepDef::new("authorize_owner").skip_if(|d: &ProductWriteCtxData| d.op.is_create()),
    StepDef::new("validate_product").skip_if(|d: &ProductWriteCtxData| d.op.is_delete()),
    StepDef::new("check_category").skip_if(|d: &ProductWriteCtxData| d.op.is_delete()),
    StepDef::new("persist"),
  ]);

  p.on("load_existing", load_existing);
  p.on("authorize_owner", authorize_owner);
  p.on("validate_product", validate_product);
  p.on("check_category", check_category);
  p.on("persist", persist);
  // The cached categories listing embeds products.
  p.after("persist", |ctx_data: ContextData<ProductWriteCtxData>| async move {
    let cache = ctx_data.read().app_state.cache.clone();
    category_cache::invalidate(cache.as_ref()).await;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register(p);
  info!("Product write pipeline registered.");
}

async fn load_existing(ctx_data: ContextData<ProductWriteCtxData>) -> AppResult<PipelineControl> {
  let (target, products) = {
    let guard = ctx_data.read();
    (guard.op.target_id(), guard.app_state.repos.products.clone())
  };
  let id = target.ok_or_else(|| AppError::Internal("Product write without a target id.".to_string()))?;

  match products.find(id).await? {
    Some(product) => {
      ctx_data.write().existing = Some(product);
      Ok(PipelineControl::Continue)
    }
    None => Err(AppError::NotFound(format!("Product with ID {} not found.", id))),
  }
}

fn authorize_owner_sync(data: &ProductWriteCtxData) -> AppResult<()> {
  let existing = data
    .existing
    .as_ref()
    .ok_or_else(|| AppError::Internal("Ownership check before product load.".to_string()))?;
  match data.caller_role {
    Role::Admin => Ok(()),
    Role::Seller if existing.seller_id == Some(data.caller_id) => Ok(()),
    _ => {
      warn!(
        caller_id = data.caller_id,
        product_id = existing.id,
        "Caller does not own this product."
      );
      Err(AppError::Forbidden("You can only modify your own products.".to_string()))
    }
  }
}

async fn authorize_owner(ctx_data: ContextData<ProductWriteCtxData>) -> AppResult<PipelineControl> {
  ctx_data.with(authorize_owner_sync)?;
  Ok(PipelineControl::Continue)
}

async fn validate_product(ctx_data: ContextData<ProductWriteCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  let input = guard
    .input
    .clone()
    .ok_or_else(|| AppError::Validation("Product body is required.".to_string()))?;

  let image = input.image.map(|i| i.trim().to_string()).unwrap_or_default();
  guard.draft = Some(ProductDraft {
    name: required_text("Name", &input.name, PRODUCT_NAME_MAX_CHARS)?,
    price: normalize_price(input.price)?,
    image,
    category_id: input.category_id,
  });
  Ok(PipelineControl::Continue)
}

async fn check_category(ctx_data: ContextData<ProductWriteCtxData>) -> AppResult<PipelineControl> {
  let (category_id, categories) = {
    let guard = ctx_data.read();
    (
      guard.draft.as_ref().map(|d| d.category_id),
      guard.app_state.repos.categories.clone(),
    )
  };
  let category_id = category_id.ok_or_else(|| AppError::Internal("Category check before validation.".to_string()))?;

  if categories.find(category_id).await?.is_none() {
    return Err(AppError::Validation(format!("Category with ID {} does not exist.", category_id)));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "product::persist", skip(ctx_data))]
async fn persist(ctx_data: ContextData<ProductWriteCtxData>) -> AppResult<PipelineControl> {
  let (op, draft, caller_id, products) = {
    let guard = ctx_data.read();
    (
      guard.op,
      guard.draft.clone(),
      guard.caller_id,
      guard.app_state.repos.products.clone(),
    )
  };
  let missing_draft = || AppError::Internal("Product draft missing.".to_string());

  match op {
    WriteOp::Create => {
      let product = products.create(draft.ok_or_else(missing_draft)?, Some(caller_id)).await?;
      info!(product_id = product.id, "Product created.");
      ctx_data.write().product = Some(product);
    }
    WriteOp::Update(id) => {
      let product = products
        .update(id, draft.ok_or_else(missing_draft)?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", id)))?;
      info!(product_id = id, "Product updated.");
      ctx_data.write().product = Some(product);
    }
    WriteOp::Delete(id) => {
      if !products.delete(id).await? {
        return Err(AppError::NotFound(format!("Product with ID {} not found.", id)));
      }
      info!(product_id = id, "Product deleted.");
    }
  }
  Ok(PipelineControl::Continue)
}
