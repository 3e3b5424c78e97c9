// src/registry.rs

//! `Registry<AppErr>`: holds one pipeline per context type and dispatches
//! runs by the type of the `ContextData` handed to it.

use crate::core::{ContextData, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedPipeline<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` holds a `ContextData<TData>` for the wrapped pipeline's `TData`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr>;
}

#[async_trait]
impl<TData, PipeErr, AppErr> ErasedPipeline<AppErr> for Pipeline<TData, PipeErr>
where
  TData: 'static + Send + Sync,
  PipeErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<PipeErr> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, AppErr> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Registry dispatched a context of the wrong type.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.run(ctx_data).await.map_err(AppErr::from)
  }
}

/// Type-keyed pipeline registry. `AppErr` is what `run` reports; it must
/// absorb both `FlowError` and every registered pipeline's handler error.
pub struct Registry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipelines: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<AppErr>>>>,
}

impl<AppErr> Default for Registry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> Registry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      pipelines: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for its context type, replacing any earlier one.
  pub fn register<TData, PipeErr>(&self, pipeline: Pipeline<TData, PipeErr>)
  where
    TData: 'static + Send + Sync,
    PipeErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<PipeErr>,
  {
    event!(
      Level::DEBUG,
      context_type = %std::any::type_name::<TData>(),
      steps = ?pipeline.step_names(),
      "Registering pipeline."
    );
    let previous = self.pipelines.write().insert(TypeId::of::<TData>(), Arc::new(pipeline));
    if previous.is_some() {
      event!(Level::WARN, context_type = %std::any::type_name::<TData>(), "Replaced an existing pipeline.");
    }
  }

  pub fn contains<TData: 'static>(&self) -> bool {
    self.pipelines.read().contains_key(&TypeId::of::<TData>())
  }

  pub fn len(&self) -> usize {
    self.pipelines.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.pipelines.read().is_empty()
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.pipelines.read().get(&TypeId::of::<TData>()).cloned();
    let runner = runner.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %type_name, "No pipeline registered.");
      AppErr::from(FlowError::NotRegistered { type_name })
    })?;
    runner.run_erased(Box::new(ctx_data)).await
  }
}
