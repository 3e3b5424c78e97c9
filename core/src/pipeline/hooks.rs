// src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.
//!
//! Handlers may return any error type convertible into the pipeline's `Err`,
//! so a step written against `anyhow::Error` or `FlowError` plugs into an
//! application pipeline unchanged.

use super::{Handler, Pipeline};
use crate::core::{ContextData, PipelineControl};
use crate::error::FlowError;
use std::future::Future;

fn boxed<TData, Err, F, E>(handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: 'static,
  F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
  E: Into<Err> + Send + 'static,
{
  Box::new(move |ctx_data| {
    let fut = handler_fn(ctx_data);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn before<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + 'static,
  {
    self.handlers_mut(step_name).before.push(boxed(handler_fn));
  }

  pub fn on<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + 'static,
  {
    self.handlers_mut(step_name).on.push(boxed(handler_fn));
  }

  pub fn after<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + 'static,
  {
    self.handlers_mut(step_name).after.push(boxed(handler_fn));
  }
}
