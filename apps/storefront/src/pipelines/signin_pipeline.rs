// apps/storefront/src/pipelines/signin_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::LoginCtxData;
use crate::services::auth_service;
use storeflow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{info, instrument, warn};

/// Same message for unknown email and wrong password.
pub const LOGIN_FAILED_MESSAGE: &str = "Wrong email or password.";

fn login_failed() -> AppError {
  AppError::Validation(LOGIN_FAILED_MESSAGE.to_string())
}

pub fn register_signin_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<LoginCtxData, AppError>::new(vec![
    StepDef::new("find_account"),
    StepDef::new("verify_credentials"),
    StepDef::new("issue_token"),
  ]);

  p.on("find_account", find_account);
  p.on("verify_credentials", verify_credentials);
  p.on("issue_token", issue_token);

  registry.register(p);
  info!("Login pipeline registered.");
}

#[instrument(name = "signin::find_account", skip(ctx_data))]
async fn find_account(ctx_data: ContextData<LoginCtxData>) -> AppResult<PipelineControl> {
  let (email, users) = {
    let guard = ctx_data.read();
    (guard.email.trim().to_string(), guard.app_state.repos.users.clone())
  };

  match users.find_by_email(&email).await? {
    Some(user) => {
      ctx_data.write().user = Some(user);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!(%email, "Login attempt for unknown email.");
      Err(login_failed())
    }
  }
}

async fn verify_credentials(ctx_data: ContextData<LoginCtxData>) -> AppResult<PipelineControl> {
  let (stored_hash, password) = {
    let guard = ctx_data.read();
    let hash = guard.user.as_ref().map(|u| u.password_hash.clone()).ok_or_else(login_failed)?;
    (hash, guard.password.clone())
  };

  if auth_service::verify_password(&stored_hash, &password)? {
    Ok(PipelineControl::Continue)
  } else {
    warn!("Login attempt with wrong password.");
    Err(login_failed())
  }
}

async fn issue_token(ctx_data: ContextData<LoginCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  let user = guard.user.as_ref().ok_or_else(login_failed)?;
  let token = guard.app_state.tokens.issue(user)?;
  info!(user_id = user.id, "Token issued.");
  guard.token = Some(token);
  Ok(PipelineControl::Continue)
}
