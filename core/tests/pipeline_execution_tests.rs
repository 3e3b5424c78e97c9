// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::time::Duration;
use storeflow::{ContextData, Pipeline, PipelineControl, PipelineResult, StepDef};

fn steps(names: &[&str]) -> Vec<StepDef<TestContext>> {
  names.iter().map(|n| StepDef::new(*n)).collect()
}

#[tokio::test]
#[serial]
async fn test_runs_steps_in_declared_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["validate", "persist", "respond"]));
  // Registered out of order on purpose.
  pipeline.on("respond", recorder("respond"));
  pipeline.on("validate", recorder("validate"));
  pipeline.on("persist", recorder("persist"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Completed));
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.trail, vec!["validate", "persist", "respond"]);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_phases_run_in_sequence() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["only"]));
  pipeline.after("only", recorder("after"));
  pipeline.on("only", recorder("on"));
  pipeline.before("only", recorder("before"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn test_stop_halts_remaining_phases_and_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["a", "b", "c"]));
  pipeline.on("a", recorder("a"));
  pipeline.before("b", recorder("b_before"));
  pipeline.on("b", recorder("b_on"));
  pipeline.on("c", recorder("c"));

  let ctx = ContextData::new(TestContext {
    stop_at: Some("b_before".to_string()),
    ..Default::default()
  });
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Ok(PipelineResult::Stopped));
  assert_eq!(ctx.read().trail, vec!["a", "b_before"]);
}

#[tokio::test]
#[serial]
async fn test_handler_error_is_returned_and_later_steps_do_not_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["good", "bad", "never"]));
  pipeline.on("good", recorder("good"));
  pipeline.on("bad", failing("bad"));
  pipeline.on("never", recorder("never"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TestError::Handler("bad".to_string())));
  assert_eq!(ctx.read().trail, vec!["good", "bad"]);
}

#[tokio::test]
#[serial]
async fn test_skip_condition_sees_state_written_by_earlier_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(vec![
    StepDef::new("first"),
    StepDef::new("skipped").skip_if(|data: &TestContext| data.counter > 0),
    StepDef::new("last"),
  ]);
  pipeline.on("first", recorder("first"));
  pipeline.on("skipped", recorder("skipped"));
  pipeline.on("last", recorder("last"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  assert_eq!(ctx.read().trail, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn test_optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(vec![
    StepDef::new("first"),
    StepDef::new("maybe").optional(),
  ]);
  pipeline.on("first", recorder("first"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await, Ok(PipelineResult::Completed));
  assert_eq!(ctx.read().counter, 1);
}

#[tokio::test]
#[serial]
async fn test_required_step_without_handlers_fails() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["first", "missing"]));
  pipeline.on("first", recorder("first"));

  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Flow(msg)) => assert!(msg.contains("missing"), "unexpected message: {msg}"),
    other => panic!("expected a flow error, got {other:?}"),
  }
}

#[tokio::test]
#[serial]
async fn test_async_handlers_share_state_across_awaits() {
  setup_tracing();
  async fn slow_increment(ctx: ContextData<TestContext>) -> Result<PipelineControl, TestError> {
    let before = ctx.read().counter;
    tokio::time::sleep(Duration::from_millis(5)).await;
    ctx.update(|data| {
      data.counter = before + 10;
      data.trail.push("slow".to_string());
    });
    Ok(PipelineControl::Continue)
  }

  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["slow", "after_slow"]));
  pipeline.on("slow", slow_increment);
  pipeline.on("after_slow", recorder("after_slow"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.counter, 11);
  assert_eq!(guard.trail, vec!["slow", "after_slow"]);
}

#[test]
#[should_panic(expected = "not declared")]
fn test_registering_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(steps(&["known"]));
  pipeline.on("unknown", recorder("unknown"));
}

#[test]
#[should_panic(expected = "declared twice")]
fn test_duplicate_step_names_panic() {
  let _ = Pipeline::<TestContext, TestError>::new(steps(&["dup", "dup"]));
}

#[tokio::test]
#[serial]
async fn test_anyhow_handler_errors_become_flow_handler_errors() {
  use anyhow::Context;
  use storeflow::FlowError;

  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new(steps(&["parse_quantity", "never"]));
  pipeline.on("parse_quantity", |ctx: ContextData<TestContext>| async move {
    let quantity: i32 = "not-a-number".parse().context("quantity field")?;
    ctx.write().counter = quantity;
    Ok::<_, anyhow::Error>(PipelineControl::Continue)
  });
  pipeline.on("never", |ctx: ContextData<TestContext>| {
    ctx.write().trail.push("never".to_string());
    std::future::ready(Ok::<_, FlowError>(PipelineControl::Continue))
  });

  let ctx = ContextData::new(TestContext::default());
  match pipeline.run(ctx.clone()).await {
    Err(FlowError::Handler { source }) => assert!(source.to_string().contains("quantity field")),
    other => panic!("expected a handler failure, got {:?}", other),
  }
  assert!(ctx.read().trail.is_empty());
}
