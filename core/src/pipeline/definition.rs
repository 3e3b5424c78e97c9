// src/pipeline/definition.rs

use super::Handler;
use crate::core::step::StepDef;
use crate::error::FlowError;
use std::collections::HashMap;

/// Handlers registered for one step, by phase.
pub(crate) struct StepHandlers<TData: 'static + Send + Sync, Err> {
  pub(crate) before: Vec<Handler<TData, Err>>,
  pub(crate) on: Vec<Handler<TData, Err>>,
  pub(crate) after: Vec<Handler<TData, Err>>,
}

impl<TData: 'static + Send + Sync, Err> Default for StepHandlers<TData, Err> {
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

impl<TData: 'static + Send + Sync, Err> StepHandlers<TData, Err> {
  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

/// An ordered set of named steps over the context type `TData`.
///
/// `Err` is what handlers return; it must absorb `FlowError` so the runtime
/// can report its own failures (a required step without handlers) through
/// the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<String, StepHandlers<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(steps: Vec<StepDef<TData>>) -> Self {
    let mut seen = std::collections::HashSet::new();
    for step in &steps {
      if !seen.insert(step.name.as_str()) {
        panic!("Pipeline setup error: step '{}' declared twice.", step.name);
      }
    }
    Self {
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Panics on an unknown step name: that is a wiring mistake, not a runtime condition.
  pub(crate) fn handlers_mut(&mut self, step_name: &str) -> &mut StepHandlers<TData, Err> {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Pipeline setup error: step '{}' is not declared.", step_name);
    }
    self.handlers.entry(step_name.to_string()).or_default()
  }
}
