// apps/storefront/src/pipelines/category_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::common_steps::{required_text, CATEGORY_NAME_MAX_CHARS};
use crate::pipelines::contexts::{CategoryWriteCtxData, WriteOp};
use crate::services::category_cache;
use storeflow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{info, instrument, warn};

pub fn register_category_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<CategoryWriteCtxData, AppError>::new(vec![
    StepDef::new("validate_name").skip_if(|d: &CategoryWriteCtxData| d.op.is_delete()),
    StepDef::new("ensure_exists").skip_if(|d: &CategoryWriteCtxData| d.op.is_create()),
    StepDef::new("check_unused").skip_if(|d: &CategoryWriteCtxData| !d.op.is_delete()),
    StepDef::new("persist"),
  ]);

  p.on("validate_name", |ctx_data: ContextData<CategoryWriteCtxData>| async move {
    ctx_data.update(|data| {
      let name = required_text("Name", data.name.as_deref().unwrap_or_default(), CATEGORY_NAME_MAX_CHARS)?;
      data.name = Some(name);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });
  p.on("ensure_exists", ensure_exists);
  p.on("check_unused", check_unused);
  p.on("persist", persist);
  p.after("persist", |ctx_data: ContextData<CategoryWriteCtxData>| async move {
    let cache = ctx_data.read().app_state.cache.clone();
    category_cache::invalidate(cache.as_ref()).await;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register(p);
  info!("Category write pipeline registered.");
}

fn target_id(ctx_data: &ContextData<CategoryWriteCtxData>) -> AppResult<i32> {
  ctx_data
    .read()
    .op
    .target_id()
    .ok_or_else(|| AppError::Internal("Category write without a target id.".to_string()))
}

async fn ensure_exists(ctx_data: ContextData<CategoryWriteCtxData>) -> AppResult<PipelineControl> {
  let id = target_id(&ctx_data)?;
  let categories = ctx_data.read().app_state.repos.categories.clone();

  if categories.find(id).await?.is_none() {
    return Err(AppError::NotFound(format!("Category with ID {} not found.", id)));
  }
  Ok(PipelineControl::Continue)
}

async fn check_unused(ctx_data: ContextData<CategoryWriteCtxData>) -> AppResult<PipelineControl> {
  let id = target_id(&ctx_data)?;
  let categories = ctx_data.read().app_state.repos.categories.clone();

  let in_use = categories.product_count(id).await?;
  if in_use > 0 {
    warn!(category_id = id, products = in_use, "Refusing to delete a category that has products.");
    return Err(AppError::Conflict(format!(
      "Category {} still has {} product(s); move or delete them first.",
      id, in_use
    )));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "category::persist", skip(ctx_data))]
async fn persist(ctx_data: ContextData<CategoryWriteCtxData>) -> AppResult<PipelineControl> {
  let (op, name, categories) = {
    let guard = ctx_data.read();
    (guard.op, guard.name.clone().unwrap_or_default(), guard.app_state.repos.categories.clone())
  };

  let not_found = |id: i32| AppError::NotFound(format!("Category with ID {} not found.", id));
  match op {
    WriteOp::Create => {
      let category = categories.create(&name).await?;
      info!(category_id = category.id, "Category created.");
      ctx_data.write().category = Some(category);
    }
    WriteOp::Update(id) => {
      let category = categories.rename(id, &name).await?.ok_or_else(|| not_found(id))?;
      info!(category_id = id, "Category renamed.");
      ctx_data.write().category = Some(category);
    }
    WriteOp::Delete(id) => {
      if !categories.delete(id).await? {
        return Err(not_found(id));
      }
      info!(category_id = id, "Category deleted.");
    }
  }
  Ok(PipelineControl::Continue)
}
