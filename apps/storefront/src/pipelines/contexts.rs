// apps/storefront/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers wrap these in
//! `storeflow::ContextData`; steps read inputs and write results back.

use crate::models::{CartView, Category, Product, ProductDraft, Role, User};
use crate::state::AppState;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Which write a product or category pipeline performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
  Create,
  Update(i32),
  Delete(i32),
}

impl WriteOp {
  pub fn target_id(&self) -> Option<i32> {
    match self {
      WriteOp::Create => None,
      WriteOp::Update(id) | WriteOp::Delete(id) => Some(*id),
    }
  }

  pub fn is_create(&self) -> bool {
    matches!(self, WriteOp::Create)
  }

  pub fn is_delete(&self) -> bool {
    matches!(self, WriteOp::Delete(_))
  }
}

/// Self-service registration and admin-created accounts.
#[derive(Clone)]
pub struct RegisterCtxData {
  pub app_state: AppState,
  pub name: String,
  pub last_name: String,
  pub email: String,
  pub password: String,
  pub phone_number: Option<String>,
  pub birth_date: Option<DateTime<Utc>>,
  pub role: Role,
  pub password_hash: Option<String>,
  pub created_user: Option<User>,
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub token: Option<String>,
}

#[derive(Clone)]
pub struct UserUpdateCtxData {
  pub app_state: AppState,
  pub caller_id: i32,
  pub caller_role: Role,
  pub target_id: i32,
  pub name: String,
  pub last_name: String,
  pub email: String,
  pub phone_number: Option<String>,
  pub birth_date: Option<DateTime<Utc>>,
  /// `None` keeps the current role.
  pub role: Option<Role>,
  pub existing: Option<User>,
  pub updated_user: Option<User>,
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: i32,
  pub product_id: i32,
  pub quantity: i32,
  pub cart: Option<CartView>,
}

/// Raw product fields as submitted; validated into `draft`.
#[derive(Debug, Clone)]
pub struct ProductInput {
  pub name: String,
  pub price: Decimal,
  pub image: Option<String>,
  pub category_id: i32,
}

#[derive(Clone)]
pub struct ProductWriteCtxData {
  pub app_state: AppState,
  pub caller_id: i32,
  pub caller_role: Role,
  pub op: WriteOp,
  pub input: Option<ProductInput>,
  pub existing: Option<Product>,
  pub draft: Option<ProductDraft>,
  pub product: Option<Product>,
}

#[derive(Clone)]
pub struct CategoryWriteCtxData {
  pub app_state: AppState,
  pub op: WriteOp,
  pub name: Option<String>,
  pub category: Option<Category>,
}
