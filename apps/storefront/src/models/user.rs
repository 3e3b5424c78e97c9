// apps/storefront/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
  User,
  Seller,
  Admin,
}

impl Role {
  pub const ALL: [Role; 3] = [Role::User, Role::Seller, Role::Admin];

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::User => "User",
      Role::Seller => "Seller",
      Role::Admin => "Admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
  type Err = UnknownRole;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "User" => Ok(Role::User),
      "Seller" => Ok(Role::Seller),
      "Admin" => Ok(Role::Admin),
      other => Err(UnknownRole(other.to_string())),
    }
  }
}

impl TryFrom<String> for Role {
  type Error = UnknownRole;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i32,
  pub name: String,
  #[serde(rename = "lName")]
  pub last_name: String,
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  #[sqlx(try_from = "String")]
  pub role: Role,
  #[serde(rename = "pNumber")]
  pub phone_number: Option<String>,
  #[serde(rename = "bDate")]
  pub birth_date: Option<DateTime<Utc>>,
}

/// Everything needed to insert a user row; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub last_name: String,
  pub email: String,
  pub password_hash: String,
  pub role: Role,
  pub phone_number: Option<String>,
  pub birth_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UserChanges {
  pub name: String,
  pub last_name: String,
  pub email: String,
  pub phone_number: Option<String>,
  pub birth_date: Option<DateTime<Utc>>,
  pub role: Role,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_role_parses_known_names_only() {
    for role in Role::ALL {
      assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
    assert!("admin".parse::<Role>().is_err());
    assert!("".parse::<Role>().is_err());
  }

  #[test]
  fn test_user_json_hides_password_hash_and_uses_short_names() {
    let user = User {
      id: 7,
      name: "Ada".into(),
      last_name: "Lovelace".into(),
      email: "ada@example.com".into(),
      password_hash: "$argon2id$secret".into(),
      role: Role::Seller,
      phone_number: Some("555-0100".into()),
      birth_date: None,
    };
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["lName"], "Lovelace");
    assert_eq!(value["pNumber"], "555-0100");
    assert_eq!(value["role"], "Seller");
    assert!(value.get("passwordHash").is_none());
    assert!(value.get("password_hash").is_none());
  }
}
