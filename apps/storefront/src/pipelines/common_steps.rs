// apps/storefront/src/pipelines/common_steps.rs

//! Field checks shared by several pipelines.

use crate::errors::{AppError, Result};
use rust_decimal::Decimal;

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 255;
pub const CATEGORY_NAME_MAX_CHARS: usize = 75;
pub const PRODUCT_NAME_MAX_CHARS: usize = 200;

/// Trims `value` and checks it holds 1..=`max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(AppError::Validation(format!("{} is required.", field)));
  }
  if trimmed.chars().count() > max {
    return Err(AppError::Validation(format!("{} must be at most {} characters.", field, max)));
  }
  Ok(trimmed.to_string())
}

pub fn validate_email(email: &str) -> Result<String> {
  let email = required_text("Email", email, EMAIL_MAX_CHARS)?;
  if !email.contains('@') {
    return Err(AppError::Validation("Valid email is required.".to_string()));
  }
  Ok(email)
}

pub fn validate_password(password: &str) -> Result<()> {
  let len = password.chars().count();
  if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
    return Err(AppError::Validation(format!(
      "Password must be between {} and {} characters long.",
      PASSWORD_MIN_CHARS, PASSWORD_MAX_CHARS
    )));
  }
  Ok(())
}

/// Accepts non-negative prices with at most two fractional digits and pins
/// them to scale 2, the column's scale.
pub fn normalize_price(price: Decimal) -> Result<Decimal> {
  if price.is_sign_negative() && !price.is_zero() {
    return Err(AppError::Validation("Price cannot be negative.".to_string()));
  }
  let mut normalized = price.normalize();
  if normalized.scale() > 2 {
    return Err(AppError::Validation("Price may have at most two decimal places.".to_string()));
  }
  normalized.rescale(2);
  Ok(normalized)
}

pub fn optional_text(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  #[test]
  fn test_required_text_trims_and_bounds_length() {
    assert_eq!(required_text("Name", "  Ada ", 10).unwrap(), "Ada");
    assert!(required_text("Name", "   ", 10).is_err());
    assert!(required_text("Name", &"x".repeat(11), 10).is_err());
    assert!(required_text("Name", &"ş".repeat(10), 10).is_ok());
  }

  #[test]
  fn test_email_and_password_rules() {
    assert!(validate_email("user@example.com").is_ok());
    assert!(validate_email("user.example.com").is_err());
    assert!(validate_password("12345").is_err());
    assert!(validate_password("123456").is_ok());
    assert!(validate_password(&"p".repeat(256)).is_err());
  }

  #[test]
  fn test_prices_are_pinned_to_two_places() {
    let p = normalize_price(Decimal::from_str("99.9").unwrap()).unwrap();
    assert_eq!(p.to_string(), "99.90");
    let p = normalize_price(Decimal::from_str("8999.990").unwrap()).unwrap();
    assert_eq!(p.to_string(), "8999.99");
    assert!(normalize_price(Decimal::from_str("1.005").unwrap()).is_err());
    assert!(normalize_price(Decimal::from_str("-0.01").unwrap()).is_err());
    assert_eq!(normalize_price(Decimal::ZERO).unwrap().to_string(), "0.00");
  }
}
