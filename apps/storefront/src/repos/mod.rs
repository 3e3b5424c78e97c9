// apps/storefront/src/repos/mod.rs

//! Data access. Each table group sits behind a trait so handlers and pipelines
//! run unchanged against Postgres or the in-memory store.

use crate::errors::{AppError, Result};
use crate::models::{
  CartLookup, CartView, Category, CategoryWithProducts, NewUser, Product, ProductDraft, User, UserChanges,
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A merged cart line would exceed what the quantity column can hold.
pub(crate) fn quantity_too_large() -> AppError {
  AppError::Validation("Cart line quantity is too large.".to_string())
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
  async fn list(&self) -> Result<Vec<User>>;
  async fn find(&self, id: i32) -> Result<Option<User>>;
  async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
  /// True when another account (other than `except_id`) already uses `email`.
  async fn email_taken(&self, email: &str, except_id: Option<i32>) -> Result<bool>;
  async fn create(&self, new_user: NewUser) -> Result<User>;
  async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>>;
  async fn delete(&self, id: i32) -> Result<bool>;
  async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
  async fn list_with_products(&self) -> Result<Vec<CategoryWithProducts>>;
  async fn find(&self, id: i32) -> Result<Option<Category>>;
  async fn create(&self, name: &str) -> Result<Category>;
  async fn rename(&self, id: i32, name: &str) -> Result<Option<Category>>;
  async fn product_count(&self, id: i32) -> Result<i64>;
  /// Fails with `Conflict` while products still reference the category.
  async fn delete(&self, id: i32) -> Result<bool>;
  async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
  async fn list(&self, category_id: Option<i32>) -> Result<Vec<Product>>;
  async fn list_by_seller(&self, seller_id: i32) -> Result<Vec<Product>>;
  async fn find(&self, id: i32) -> Result<Option<Product>>;
  async fn create(&self, draft: ProductDraft, seller_id: Option<i32>) -> Result<Product>;
  async fn update(&self, id: i32, draft: ProductDraft) -> Result<Option<Product>>;
  async fn delete(&self, id: i32) -> Result<bool>;
  async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait CartsRepo: Send + Sync {
  /// Creates the cart on first use and merges repeated products into one line.
  async fn add_item(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<CartView>;
  async fn find_by_user(&self, user_id: i32) -> Result<Option<CartView>>;
  async fn set_quantity(&self, user_id: i32, product_id: i32, quantity: i32) -> Result<CartLookup>;
  async fn remove_item(&self, user_id: i32, product_id: i32) -> Result<CartLookup>;
}

/// Handles to every repository, all backed by the same store.
#[derive(Clone)]
pub struct Repos {
  pub users: Arc<dyn UsersRepo>,
  pub categories: Arc<dyn CategoriesRepo>,
  pub products: Arc<dyn ProductsRepo>,
  pub carts: Arc<dyn CartsRepo>,
}

impl Repos {
  pub fn from_store<S>(store: Arc<S>) -> Self
  where
    S: UsersRepo + CategoriesRepo + ProductsRepo + CartsRepo + 'static,
  {
    Repos {
      users: store.clone(),
      categories: store.clone(),
      products: store.clone(),
      carts: store,
    }
  }

  pub fn postgres(pool: sqlx::PgPool) -> Self {
    Self::from_store(Arc::new(PgStore::new(pool)))
  }

  pub fn in_memory() -> Self {
    Self::from_store(Arc::new(MemoryStore::default()))
  }
}
