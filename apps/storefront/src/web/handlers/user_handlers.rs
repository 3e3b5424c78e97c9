// apps/storefront/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use storeflow::ContextData;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::Role;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData, UserUpdateCtxData};
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::payloads::{CreateUserPayload, LoginPayload, RegisterPayload, UpdateUserPayload};

fn register_ctx(app_state: &AppState, payload: RegisterPayload, role: Role) -> RegisterCtxData {
  RegisterCtxData {
    app_state: app_state.clone(),
    name: payload.name,
    last_name: payload.last_name,
    email: payload.email,
    password: payload.password,
    phone_number: payload.phone_number,
    birth_date: payload.birth_date,
    role,
    password_hash: None,
    created_user: None,
  }
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = ContextData::new(register_ctx(&app_state, req_payload.into_inner(), Role::User));

  if let Err(app_err) = run_to_completion(&app_state.flows, ctx_data.clone()).await {
    warn!(error = %app_err, "Registration failed.");
    return Err(app_err);
  }

  let user = ctx_data.read().created_user.clone().ok_or_else(|| {
    warn!("Registration completed but no user was recorded.");
    AppError::Internal("Registration completed without creating a user.".to_string())
  })?;
  info!(user_id = user.id, "Registration successful.");
  Ok(HttpResponse::Created().json(json!({
    "message": "User registered successfully.",
    "user": user,
  })))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(LoginCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    token: None,
  });

  run_to_completion(&app_state.flows, ctx_data.clone()).await?;

  let token = ctx_data
    .read()
    .token
    .clone()
    .ok_or_else(|| AppError::Internal("Login completed without issuing a token.".to_string()))?;
  Ok(HttpResponse::Ok().json(json!({ "token": token })))
}

#[instrument(name = "handler::list_users", skip(auth_user, app_state), fields(caller = auth_user.user_id))]
pub async fn list_users_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  let users = app_state.repos.users.list().await?;
  Ok(HttpResponse::Ok().json(users))
}

#[instrument(name = "handler::get_user", skip(auth_user, app_state, path), fields(caller = auth_user.user_id))]
pub async fn get_user_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  auth_user.require_self_or_admin(user_id)?;

  match app_state.repos.users.find(user_id).await? {
    Some(user) => Ok(HttpResponse::Ok().json(user)),
    None => Err(AppError::NotFound(format!("User with ID {} not found.", user_id))),
  }
}

#[instrument(name = "handler::create_user", skip(auth_user, app_state, req_payload), fields(caller = auth_user.user_id))]
pub async fn create_user_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateUserPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(register_ctx(&app_state, payload.account, payload.role));

  run_to_completion(&app_state.flows, ctx_data.clone()).await?;

  let user = ctx_data
    .read()
    .created_user
    .clone()
    .ok_or_else(|| AppError::Internal("User creation completed without a user.".to_string()))?;
  Ok(HttpResponse::Created().json(user))
}

#[instrument(name = "handler::update_user", skip(auth_user, app_state, path, req_payload), fields(caller = auth_user.user_id))]
pub async fn update_user_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
  req_payload: web::Json<UpdateUserPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx_data = ContextData::new(UserUpdateCtxData {
    app_state: app_state.get_ref().clone(),
    caller_id: auth_user.user_id,
    caller_role: auth_user.role,
    target_id: path.into_inner(),
    name: payload.name,
    last_name: payload.last_name,
    email: payload.email,
    phone_number: payload.phone_number,
    birth_date: payload.birth_date,
    role: payload.role,
    existing: None,
    updated_user: None,
  });

  run_to_completion(&app_state.flows, ctx_data.clone()).await?;

  let user = ctx_data
    .read()
    .updated_user
    .clone()
    .ok_or_else(|| AppError::Internal("User update completed without a result.".to_string()))?;
  Ok(HttpResponse::Ok().json(user))
}

#[instrument(name = "handler::delete_user", skip(auth_user, app_state, path), fields(caller = auth_user.user_id))]
pub async fn delete_user_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  let user_id = path.into_inner();

  if !app_state.repos.users.delete(user_id).await? {
    return Err(AppError::NotFound(format!("User with ID {} not found.", user_id)));
  }
  info!(user_id, "User deleted.");
  Ok(HttpResponse::NoContent().finish())
}
