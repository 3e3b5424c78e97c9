// apps/storefront/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use storeflow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  /// Missing, malformed, or expired credentials.
  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// Authenticated, but the role or ownership check failed.
  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  /// The inference server could not be reached or refused the request.
  #[error("Upstream Error: {0}")]
  Upstream(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Cache Error: {0}")]
  Cache(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  /// A pipeline returned `Stopped` where the handler expected completion.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl From<redis::RedisError> for AppError {
  fn from(err: redis::RedisError) -> Self {
    AppError::Cache(err.to_string())
  }
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    AppError::Upstream(err.to_string())
  }
}

/// Translates constraint violations into client errors; everything else
/// stays a database error.
pub fn map_db_error(err: sqlx::Error) -> AppError {
  if let sqlx::Error::Database(db_err) = &err {
    match db_err.code().as_deref() {
      Some("23505") if db_err.constraint() == Some("users_email_key") => {
        return AppError::Validation("An account with this email already exists.".to_string());
      }
      Some("23505") => {
        return AppError::Validation("A record with the same unique value already exists.".to_string());
      }
      Some("23503") => {
        return AppError::Validation("A referenced record does not exist.".to_string());
      }
      _ => {}
    }
  }
  AppError::Sqlx(err)
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Cache(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with client error");
    }

    let body = match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m) => json!({ "error": m }),
      AppError::Upstream(m) => json!({ "error": "Chat service unavailable", "detail": m }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
      AppError::Sqlx(_) => json!({ "error": "Database operation failed" }),
      AppError::Cache(_) => json!({ "error": "Cache operation failed" }),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        json!({ "error": "Workflow processing error", "detail": source.to_string() })
      }
      AppError::Internal(m) => json!({ "error": "An internal error occurred", "detail": m }),
      AppError::PipelineHaltedByHandler => json!({ "error": "Process halted by business logic." }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
