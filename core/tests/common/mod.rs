// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::future::{ready, Ready};
use storeflow::{ContextData, FlowError, PipelineControl};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(e.to_string())
  }
}

pub type TestOutcome = Ready<Result<PipelineControl, TestError>>;

/// Records `label` in the trail; stops the run if `stop_at` names it.
pub fn recorder(label: &'static str) -> impl Fn(ContextData<TestContext>) -> TestOutcome + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| {
    let control = ctx.update(|data| {
      data.counter += 1;
      data.trail.push(label.to_string());
      if data.stop_at.as_deref() == Some(label) {
        PipelineControl::Stop
      } else {
        PipelineControl::Continue
      }
    });
    ready(Ok(control))
  }
}

pub fn failing(label: &'static str) -> impl Fn(ContextData<TestContext>) -> TestOutcome + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| {
    ctx.write().trail.push(label.to_string());
    ready(Err(TestError::Handler(label.to_string())))
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
