// src/pipeline/mod.rs

//! `Pipeline<TData, Err>`: definition, handler registration, and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

use crate::core::{ContextData, PipelineControl};
use std::future::Future;
use std::pin::Pin;

pub use definition::Pipeline;

pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// A boxed step handler. It receives its own clone of the run's
/// `ContextData` and must release any lock guard before awaiting.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;
