// apps/storefront/src/web/handlers/category_handlers.rs

use actix_web::{web, HttpResponse};
use storeflow::ContextData;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines::contexts::{CategoryWriteCtxData, WriteOp};
use crate::pipelines::run_to_completion;
use crate::services::category_cache;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::payloads::CategoryPayload;

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let listing = category_cache::list_categories(app_state.cache.as_ref(), app_state.repos.categories.as_ref()).await?;
  info!(source = ?listing.source, count = listing.data.len(), "Categories listed.");
  Ok(HttpResponse::Ok().json(listing))
}

#[instrument(name = "handler::get_category", skip(app_state, path), fields(category_id = %path.as_ref()))]
pub async fn get_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  let category_id = path.into_inner();
  match app_state.repos.categories.find(category_id).await? {
    Some(category) => Ok(HttpResponse::Ok().json(category)),
    None => Err(AppError::NotFound(format!("Category with ID {} not found.", category_id))),
  }
}

async fn run_category_write(
  app_state: &AppState,
  op: WriteOp,
  name: Option<String>,
) -> Result<ContextData<CategoryWriteCtxData>, AppError> {
  let ctx_data = ContextData::new(CategoryWriteCtxData {
    app_state: app_state.clone(),
    op,
    name,
    category: None,
  });
  run_to_completion(&app_state.flows, ctx_data.clone()).await?;
  Ok(ctx_data)
}

#[instrument(name = "handler::create_category", skip(auth_user, app_state, req_payload), fields(caller = auth_user.user_id))]
pub async fn create_category_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  let ctx_data = run_category_write(&app_state, WriteOp::Create, Some(req_payload.into_inner().name)).await?;

  let category = ctx_data
    .read()
    .category
    .clone()
    .ok_or_else(|| AppError::Internal("Category creation completed without a category.".to_string()))?;
  Ok(HttpResponse::Created().json(category))
}

#[instrument(name = "handler::update_category", skip(auth_user, app_state, path, req_payload), fields(caller = auth_user.user_id))]
pub async fn update_category_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
  req_payload: web::Json<CategoryPayload>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  let op = WriteOp::Update(path.into_inner());
  run_category_write(&app_state, op, Some(req_payload.into_inner().name)).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::delete_category", skip(auth_user, app_state, path), fields(caller = auth_user.user_id))]
pub async fn delete_category_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_admin()?;
  run_category_write(&app_state, WriteOp::Delete(path.into_inner()), None).await?;
  Ok(HttpResponse::NoContent().finish())
}
