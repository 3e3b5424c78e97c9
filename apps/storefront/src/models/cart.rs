// apps/storefront/src/models/cart.rs

use super::product::ProductSummary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Cart {
  pub id: i32,
  pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: i32,
  pub product_id: i32,
  pub quantity: i32,
  pub product: ProductSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub id: i32,
  pub user_id: i32,
  pub cart_items: Vec<CartLine>,
  pub total: Decimal,
}

impl CartView {
  pub fn new(cart: Cart, cart_items: Vec<CartLine>) -> Self {
    let total = cart_items
      .iter()
      .map(|line| line.product.price * Decimal::from(line.quantity))
      .sum();
    CartView {
      id: cart.id,
      user_id: cart.user_id,
      cart_items,
      total,
    }
  }
}

/// Outcome of an operation on an existing cart line.
#[derive(Debug, Clone, PartialEq)]
pub enum CartLookup {
  NoCart,
  NoLine,
  Found(CartView),
}
