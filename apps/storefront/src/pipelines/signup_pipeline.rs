// apps/storefront/src/pipelines/signup_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::NewUser;
use crate::pipelines::common_steps::{optional_text, required_text, validate_email, validate_password, NAME_MAX_CHARS};
use crate::pipelines::contexts::RegisterCtxData;
use crate::services::auth_service;
use storeflow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{info, instrument, warn};

pub fn register_signup_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<RegisterCtxData, AppError>::new(vec![
    StepDef::new("validate_registration"),
    StepDef::new("check_email_available"),
    StepDef::new("hash_password"),
    StepDef::new("insert_user"),
  ]);

  p.on("validate_registration", validate_registration);
  p.on("check_email_available", check_email_available);
  p.on("hash_password", hash_password);
  p.on("insert_user", insert_user);

  registry.register(p);
  info!("Registration pipeline registered.");
}

async fn validate_registration(ctx_data: ContextData<RegisterCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  guard.name = required_text("Name", &guard.name, NAME_MAX_CHARS)?;
  guard.last_name = required_text("Last name", &guard.last_name, NAME_MAX_CHARS)?;
  guard.email = validate_email(&guard.email)?;
  validate_password(&guard.password)?;
  guard.phone_number = optional_text(guard.phone_number.take());
  Ok(PipelineControl::Continue)
}

#[instrument(name = "signup::check_email_available", skip(ctx_data))]
async fn check_email_available(ctx_data: ContextData<RegisterCtxData>) -> AppResult<PipelineControl> {
  let (email, users) = {
    let guard = ctx_data.read();
    (guard.email.clone(), guard.app_state.repos.users.clone())
  };

  if users.email_taken(&email, None).await? {
    warn!(%email, "Registration attempted with an existing email.");
    return Err(AppError::Validation("An account with this email already exists.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn hash_password(ctx_data: ContextData<RegisterCtxData>) -> AppResult<PipelineControl> {
  let password = ctx_data.read().password.clone();
  let hash = auth_service::hash_password(&password)?;
  ctx_data.write().password_hash = Some(hash);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "signup::insert_user", skip(ctx_data))]
async fn insert_user(ctx_data: ContextData<RegisterCtxData>) -> AppResult<PipelineControl> {
  let (new_user, users) = {
    let guard = ctx_data.read();
    let password_hash = guard
      .password_hash
      .clone()
      .ok_or_else(|| AppError::Internal("Password hash missing before insert.".to_string()))?;
    let new_user = NewUser {
      name: guard.name.clone(),
      last_name: guard.last_name.clone(),
      email: guard.email.clone(),
      password_hash,
      role: guard.role,
      phone_number: guard.phone_number.clone(),
      birth_date: guard.birth_date,
    };
    (new_user, guard.app_state.repos.users.clone())
  };

  // The unique index still guards against a concurrent registration.
  let user = users.create(new_user).await?;
  info!(user_id = user.id, role = %user.role, "User created.");
  ctx_data.write().created_user = Some(user);
  Ok(PipelineControl::Continue)
}
