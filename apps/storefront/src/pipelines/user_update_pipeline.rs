// apps/storefront/src/pipelines/user_update_pipeline.rs

//! Profile edits. Admins may edit anyone and change roles; other users may
//! edit only their own profile and keep their role.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Role, UserChanges};
use crate::pipelines::common_steps::{optional_text, required_text, validate_email, NAME_MAX_CHARS};
use crate::pipelines::contexts::UserUpdateCtxData;
use storeflow::{ContextData, Pipeline, PipelineControl, Registry, StepDef};
use tracing::{info, instrument, warn};

pub fn register_user_update_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<UserUpdateCtxData, AppError>::new(vec![
    StepDef::new("authorize_caller"),
    StepDef::new("load_user"),
    StepDef::new("guard_role_change").skip_if(|d: &UserUpdateCtxData| d.caller_role == Role::Admin),
    StepDef::new("validate_profile"),
    StepDef::new("check_email_available"),
    StepDef::new("persist"),
  ]);

  p.on("authorize_caller", |ctx_data: ContextData<UserUpdateCtxData>| async move {
    let (caller_id, caller_role, target_id) = ctx_data.with(|d| (d.caller_id, d.caller_role, d.target_id));
    if caller_role != Role::Admin && caller_id != target_id {
      warn!(caller_id, target_id, "Non-admin tried to edit another user.");
      return Err(AppError::Forbidden("You can only edit your own profile.".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p.on("load_user", load_user);
  p.on("guard_role_change", |ctx_data: ContextData<UserUpdateCtxData>| async move {
    ctx_data.with(|d| {
      let current = d.existing.as_ref().map(|u| u.role);
      match d.role {
        Some(requested) if Some(requested) != current => {
          Err(AppError::Forbidden("Only administrators can change roles.".to_string()))
        }
        _ => Ok(PipelineControl::Continue),
      }
    })
  });
  p.on("validate_profile", validate_profile);
  p.on("check_email_available", check_email_available);
  p.on("persist", persist);

  registry.register(p);
  info!("User update pipeline registered.");
}

async fn load_user(ctx_data: ContextData<UserUpdateCtxData>) -> AppResult<PipelineControl> {
  let (target_id, users) = {
    let guard = ctx_data.read();
    (guard.target_id, guard.app_state.repos.users.clone())
  };
  let user = users
    .find(target_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", target_id)))?;
  ctx_data.write().existing = Some(user);
  Ok(PipelineControl::Continue)
}

async fn validate_profile(ctx_data: ContextData<UserUpdateCtxData>) -> AppResult<PipelineControl> {
  let mut guard = ctx_data.write();
  guard.name = required_text("Name", &guard.name, NAME_MAX_CHARS)?;
  guard.last_name = required_text("Last name", &guard.last_name, NAME_MAX_CHARS)?;
  guard.email = validate_email(&guard.email)?;
  guard.phone_number = optional_text(guard.phone_number.take());
  Ok(PipelineControl::Continue)
}

async fn check_email_available(ctx_data: ContextData<UserUpdateCtxData>) -> AppResult<PipelineControl> {
  let (email, target_id, users) = {
    let guard = ctx_data.read();
    (guard.email.clone(), guard.target_id, guard.app_state.repos.users.clone())
  };
  if users.email_taken(&email, Some(target_id)).await? {
    return Err(AppError::Validation("An account with this email already exists.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "user_update::persist", skip(ctx_data))]
async fn persist(ctx_data: ContextData<UserUpdateCtxData>) -> AppResult<PipelineControl> {
  let (target_id, changes, users) = {
    let guard = ctx_data.read();
    let current_role = guard
      .existing
      .as_ref()
      .map(|u| u.role)
      .ok_or_else(|| AppError::Internal("User update without a loaded user.".to_string()))?;
    let changes = UserChanges {
      name: guard.name.clone(),
      last_name: guard.last_name.clone(),
      email: guard.email.clone(),
      phone_number: guard.phone_number.clone(),
      birth_date: guard.birth_date,
      role: guard.role.unwrap_or(current_role),
    };
    (guard.target_id, changes, guard.app_state.repos.users.clone())
  };

  let user = users
    .update(target_id, changes)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", target_id)))?;
  info!(user_id = user.id, role = %user.role, "User updated.");
  ctx_data.write().updated_user = Some(user);
  Ok(PipelineControl::Continue)
}
