// src/lib.rs

//! Storeflow: the async step-pipeline runtime behind the storefront service.
//!
//! A pipeline is an ordered list of named steps over one shared context.
//! Each step may carry `before`, `on` and `after` handlers; any handler can
//! stop the run early or fail it with the pipeline's error type. Pipelines
//! are registered once in a [`Registry`] and dispatched by context type.
//!
//! ```ignore
//! let mut p = Pipeline::<SignupCtx, AppError>::new(vec![
//!   StepDef::new("validate"),
//!   StepDef::new("insert_user"),
//! ]);
//! p.on("validate", validate_step);
//! p.on("insert_user", insert_user_step);
//! registry.register(p);
//! registry.run(ContextData::new(ctx)).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::{Handler, HandlerFuture, Pipeline};
pub use crate::registry::Registry;
