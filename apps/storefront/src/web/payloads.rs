// apps/storefront/src/web/payloads.rs

//! Request bodies and query strings.

use crate::models::Role;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Phone numbers arrive as strings or bare JSON numbers.
fn phone_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Phone {
    Text(String),
    Number(serde_json::Number),
  }

  Ok(Option::<Phone>::deserialize(deserializer)?.map(|p| match p {
    Phone::Text(s) => s,
    Phone::Number(n) => n.to_string(),
  }))
}

/// Accepts a full RFC 3339 timestamp or a calendar date (midnight UTC).
fn birth_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum BirthDate {
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
  }

  Ok(Option::<BirthDate>::deserialize(deserializer)?.map(|d| match d {
    BirthDate::Timestamp(ts) => ts,
    BirthDate::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
  }))
}

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub name: String,
  #[serde(rename = "lName")]
  pub last_name: String,
  pub email: String,
  pub password: String,
  #[serde(rename = "pNumber", default, deserialize_with = "phone_number")]
  pub phone_number: Option<String>,
  #[serde(rename = "bDate", default, deserialize_with = "birth_date")]
  pub birth_date: Option<DateTime<Utc>>,
}

/// Admin-created account: a registration body plus the role.
#[derive(Deserialize, Debug)]
pub struct CreateUserPayload {
  #[serde(flatten)]
  pub account: RegisterPayload,
  pub role: Role,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct UpdateUserPayload {
  pub name: String,
  #[serde(rename = "lName")]
  pub last_name: String,
  pub email: String,
  #[serde(rename = "pNumber", default, deserialize_with = "phone_number")]
  pub phone_number: Option<String>,
  #[serde(rename = "bDate", default, deserialize_with = "birth_date")]
  pub birth_date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub role: Option<Role>,
}

#[derive(Deserialize, Debug)]
pub struct CategoryPayload {
  pub name: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
  pub name: String,
  pub price: Decimal,
  #[serde(default)]
  pub image: Option<String>,
  pub category_id: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
  pub category_id: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartLineQuery {
  pub user_id: i32,
  pub product_id: i32,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartRemoveQuery {
  pub user_id: i32,
  pub product_id: i32,
}

#[derive(Deserialize, Debug)]
pub struct ChatPayload {
  #[serde(default)]
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_register_payload_accepts_numeric_phone_and_plain_date() {
    let payload: RegisterPayload = serde_json::from_value(json!({
      "name": "Ali", "lName": "Veli", "email": "ali@example.com", "password": "secret1",
      "pNumber": 5551234567u64, "bDate": "1990-05-01"
    }))
    .unwrap();
    assert_eq!(payload.phone_number.as_deref(), Some("5551234567"));
    assert_eq!(payload.birth_date.unwrap().to_rfc3339(), "1990-05-01T00:00:00+00:00");
  }

  #[test]
  fn test_optional_profile_fields_may_be_absent_or_null() {
    let payload: RegisterPayload = serde_json::from_value(json!({
      "name": "Ali", "lName": "Veli", "email": "ali@example.com", "password": "secret1", "bDate": null
    }))
    .unwrap();
    assert!(payload.phone_number.is_none());
    assert!(payload.birth_date.is_none());
  }

  #[test]
  fn test_create_user_payload_requires_known_role() {
    let body = json!({
      "name": "A", "lName": "B", "email": "a@b.c", "password": "secret1", "role": "Seller"
    });
    let payload: CreateUserPayload = serde_json::from_value(body).unwrap();
    assert_eq!(payload.role, Role::Seller);

    let bad = json!({ "name": "A", "lName": "B", "email": "a@b.c", "password": "secret1", "role": "Root" });
    assert!(serde_json::from_value::<CreateUserPayload>(bad).is_err());
  }

  #[test]
  fn test_product_price_accepts_string_or_number() {
    let a: ProductPayload = serde_json::from_value(json!({"name": "x", "price": "100.00", "categoryId": 1})).unwrap();
    let b: ProductPayload = serde_json::from_value(json!({"name": "x", "price": 100, "categoryId": 1})).unwrap();
    assert_eq!(a.price.normalize(), b.price.normalize());
  }
}
