// apps/storefront/src/models/category.rs

use super::product::ProductSummary;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
  pub id: i32,
  pub name: String,
}

/// Shape of the cached categories listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithProducts {
  pub id: i32,
  pub name: String,
  pub products: Vec<ProductSummary>,
}
