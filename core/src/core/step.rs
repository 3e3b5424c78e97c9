// src/core/step.rs

use super::ContextData;
use std::sync::Arc;

/// Evaluated against the run's context right before a step; `true` skips it.
pub type SkipCondition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

/// One named step of a pipeline.
#[derive(Clone)]
pub struct StepDef<TData: 'static + Send + Sync> {
  pub name: String,
  /// An optional step with no handlers is skipped instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: 'static + Send + Sync> StepDef<TData> {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: false,
      skip_if: None,
    }
  }

  pub fn optional(mut self) -> Self {
    self.optional = true;
    self
  }

  pub fn skip_if(mut self, cond: impl Fn(&TData) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(cond));
    self
  }

  pub(crate) fn should_skip(&self, ctx_data: &ContextData<TData>) -> bool {
    match &self.skip_if {
      Some(cond) => ctx_data.with(|data| cond(data)),
      None => false,
    }
  }
}

impl<TData: 'static + Send + Sync> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("has_skip_condition", &self.skip_if.is_some())
      .finish()
  }
}
