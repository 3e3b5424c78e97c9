// src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors raised by the pipeline runtime itself, as opposed to errors
/// returned by step handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Non-optional step '{step_name}' has no handlers")]
  HandlerMissing { step_name: String },

  #[error("No pipeline registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Context type mismatch in registry dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Step handler failed: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(source: AnyhowError) -> Self {
    FlowError::Handler { source }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
