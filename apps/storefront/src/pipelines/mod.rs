// apps/storefront/src/pipelines/mod.rs

//! Multi-step write workflows, registered once at startup and dispatched by
//! context type from the handlers.

use crate::errors::{AppError, Result as AppResult};
use storeflow::{ContextData, PipelineResult, Registry};

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod category_pipeline;
pub mod product_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;
pub mod user_update_pipeline;

pub fn register_all_pipelines(registry: &Registry<AppError>) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(registry);
  signin_pipeline::register_signin_pipeline(registry);
  user_update_pipeline::register_user_update_pipeline(registry);
  cart_pipeline::register_add_to_cart_pipeline(registry);
  product_pipeline::register_product_pipeline(registry);
  category_pipeline::register_category_pipeline(registry);

  tracing::info!(count = registry.len(), "All application pipelines registered.");
}

/// Runs the pipeline for `TData` and treats an early stop as a failure.
pub async fn run_to_completion<TData>(registry: &Registry<AppError>, ctx_data: ContextData<TData>) -> AppResult<()>
where
  TData: Send + Sync + 'static,
{
  match registry.run(ctx_data).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => {
      tracing::warn!(
        context_type = %std::any::type_name::<TData>(),
        "Pipeline was stopped by a handler."
      );
      Err(AppError::PipelineHaltedByHandler)
    }
  }
}
