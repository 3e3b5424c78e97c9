// src/pipeline/execution.rs

//! `Pipeline::run`: walks the steps in order and drives each phase's handlers.

use super::{Handler, Pipeline};
use crate::core::{ContextData, PipelineControl, PipelineResult};
use crate::error::FlowError;
use tracing::{event, info_span, Instrument, Level};

/// Runs one phase's handlers in registration order. `Some(Stopped)` means a
/// handler asked to halt.
async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<Option<PipelineResult>, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let span = tracing::debug_span!("handler", phase = phase, handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::INFO, phase = phase, "Pipeline stopped by handler.");
        return Ok(Some(PipelineResult::Stopped));
      }
      Err(e) => {
        event!(Level::ERROR, phase = phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(None)
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// A step whose skip condition holds is passed over. A step with no
  /// handlers at all is skipped when optional and fails the run with
  /// `FlowError::HandlerMissing` otherwise.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    let pipeline_span = info_span!(
      "pipeline_run",
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    );

    async move {
      for (step_idx, step_def) in self.steps.iter().enumerate() {
        let step_name = step_def.name.as_str();

        if step_def.should_skip(&ctx_data) {
          event!(Level::DEBUG, step = step_name, "Step skipped by condition.");
          continue;
        }

        let handlers = match self.handlers.get(step_name) {
          Some(h) if !h.is_empty() => h,
          _ if step_def.optional => {
            event!(Level::DEBUG, step = step_name, "Optional step has no handlers, skipping.");
            continue;
          }
          _ => {
            event!(Level::ERROR, step = step_name, "Required step has no handlers.");
            return Err(Err::from(FlowError::HandlerMissing {
              step_name: step_def.name.clone(),
            }));
          }
        };

        let step_span = tracing::debug_span!("step", step = step_name, step_index = step_idx);
        let outcome = async {
          if let Some(stopped) = run_phase("before", &handlers.before, &ctx_data).await? {
            return Ok(Some(stopped));
          }
          if let Some(stopped) = run_phase("on", &handlers.on, &ctx_data).await? {
            return Ok(Some(stopped));
          }
          run_phase("after", &handlers.after, &ctx_data).await
        }
        .instrument(step_span)
        .await?;

        if let Some(stopped) = outcome {
          return Ok(stopped);
        }
      }

      event!(Level::DEBUG, "Pipeline completed.");
      Ok(PipelineResult::Completed)
    }
    .instrument(pipeline_span)
    .await
  }
}
