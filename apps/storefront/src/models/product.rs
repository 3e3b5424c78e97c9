// apps/storefront/src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: i32,
  pub name: String,
  pub price: Decimal,
  pub image: String,
  pub category_id: i32,
  pub seller_id: Option<i32>,
}

/// The slice of a product embedded in category listings and cart lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductSummary {
  pub id: i32,
  pub name: String,
  pub price: Decimal,
  pub image: String,
}

impl From<&Product> for ProductSummary {
  fn from(p: &Product) -> Self {
    ProductSummary {
      id: p.id,
      name: p.name.clone(),
      price: p.price,
      image: p.image.clone(),
    }
  }
}

/// Validated field values for inserting or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
  pub name: String,
  pub price: Decimal,
  pub image: String,
  pub category_id: i32,
}
