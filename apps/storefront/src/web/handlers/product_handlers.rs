// apps/storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use storeflow::ContextData;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::Role;
use crate::pipelines::contexts::{ProductInput, ProductWriteCtxData, WriteOp};
use crate::pipelines::run_to_completion;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::payloads::{ProductListQuery, ProductPayload};

const SELLING_ROLES: [Role; 2] = [Role::Seller, Role::Admin];

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductListQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.repos.products.list(query_params.category_id).await?;
  info!(count = products.len(), "Products listed.");
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  match app_state.repos.products.find(product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(product)),
    None => {
      warn!(product_id, "Product not found.");
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}

#[instrument(name = "handler::my_products", skip(auth_user, app_state), fields(caller = auth_user.user_id))]
pub async fn my_products_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
  auth_user.require_role(&SELLING_ROLES)?;
  let products = app_state.repos.products.list_by_seller(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(products))
}

async fn run_product_write(
  auth_user: &AuthenticatedUser,
  app_state: &AppState,
  op: WriteOp,
  payload: Option<ProductPayload>,
) -> Result<ContextData<ProductWriteCtxData>, AppError> {
  auth_user.require_role(&SELLING_ROLES)?;

  let ctx_data = ContextData::new(ProductWriteCtxData {
    app_state: app_state.clone(),
    caller_id: auth_user.user_id,
    caller_role: auth_user.role,
    op,
    input: payload.map(|p| ProductInput {
      name: p.name,
      price: p.price,
      image: p.image,
      category_id: p.category_id,
    }),
    existing: None,
    draft: None,
    product: None,
  });
  run_to_completion(&app_state.flows, ctx_data.clone()).await?;
  Ok(ctx_data)
}

fn written_product(ctx_data: &ContextData<ProductWriteCtxData>) -> Result<HttpResponse, AppError> {
  let product = ctx_data
    .read()
    .product
    .clone()
    .ok_or_else(|| AppError::Internal("Product write completed without a product.".to_string()))?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::create_product", skip(auth_user, app_state, req_payload), fields(caller = auth_user.user_id))]
pub async fn create_product_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  req_payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let ctx_data = run_product_write(&auth_user, &app_state, WriteOp::Create, Some(req_payload.into_inner())).await?;
  let product = ctx_data
    .read()
    .product
    .clone()
    .ok_or_else(|| AppError::Internal("Product creation completed without a product.".to_string()))?;
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::update_product", skip(auth_user, app_state, path, req_payload), fields(caller = auth_user.user_id))]
pub async fn update_product_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
  req_payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  let op = WriteOp::Update(path.into_inner());
  let ctx_data = run_product_write(&auth_user, &app_state, op, Some(req_payload.into_inner())).await?;
  written_product(&ctx_data)
}

#[instrument(name = "handler::delete_product", skip(auth_user, app_state, path), fields(caller = auth_user.user_id))]
pub async fn delete_product_handler(
  auth_user: AuthenticatedUser,
  app_state: web::Data<AppState>,
  path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
  run_product_write(&auth_user, &app_state, WriteOp::Delete(path.into_inner()), None).await?;
  Ok(HttpResponse::NoContent().finish())
}
