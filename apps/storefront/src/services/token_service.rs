// apps/storefront/src/services/token_service.rs

//! Issues and validates the HS512 bearer tokens handed out at login.

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Role, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
  /// User id, as a decimal string.
  pub sub: String,
  pub email: String,
  pub role: Role,
  pub iss: String,
  pub aud: String,
  pub iat: i64,
  pub exp: i64,
}

/// Identity recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
  pub user_id: i32,
  pub email: String,
  pub role: Role,
}

pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  validation: Validation,
  issuer: String,
  audience: String,
  lifetime: Duration,
}

impl TokenService {
  pub fn from_config(config: &AppConfig) -> Self {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_issuer(&[config.jwt_issuer.as_str()]);
    validation.set_audience(&[config.jwt_audience.as_str()]);
    validation.leeway = 0;

    Self {
      encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
      validation,
      issuer: config.jwt_issuer.clone(),
      audience: config.jwt_audience.clone(),
      lifetime: Duration::minutes(config.jwt_expiry_minutes),
    }
  }

  #[instrument(name = "token_service::issue", skip(self, user), fields(user_id = user.id))]
  pub fn issue(&self, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user.id.to_string(),
      email: user.email.clone(),
      role: user.role,
      iss: self.issuer.clone(),
      aud: self.audience.clone(),
      iat: now.timestamp(),
      exp: (now + self.lifetime).timestamp(),
    };
    encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
  }

  pub fn validate(&self, token: &str) -> Result<TokenIdentity, AppError> {
    let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
      debug!(error = %e, "Bearer token rejected.");
      AppError::Auth("Invalid or expired token.".to_string())
    })?;
    let user_id = data
      .claims
      .sub
      .parse::<i32>()
      .map_err(|_| AppError::Auth("Invalid or expired token.".to_string()))?;
    Ok(TokenIdentity {
      user_id,
      email: data.claims.email,
      role: data.claims.role,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user() -> User {
    User {
      id: 42,
      name: "Grace".into(),
      last_name: "Hopper".into(),
      email: "grace@example.com".into(),
      password_hash: String::new(),
      role: Role::Admin,
      phone_number: None,
      birth_date: None,
    }
  }

  #[test]
  fn test_issued_token_validates_to_same_identity() {
    let service = TokenService::from_config(&AppConfig::for_tests());
    let token = service.issue(&user()).unwrap();
    let identity = service.validate(&token).unwrap();
    assert_eq!(
      identity,
      TokenIdentity {
        user_id: 42,
        email: "grace@example.com".into(),
        role: Role::Admin,
      }
    );
  }

  #[test]
  fn test_token_signed_with_other_secret_is_rejected() {
    let mut other = AppConfig::for_tests();
    other.jwt_secret = "a-completely-different-secret".into();
    let token = TokenService::from_config(&other).issue(&user()).unwrap();

    let service = TokenService::from_config(&AppConfig::for_tests());
    assert!(matches!(service.validate(&token), Err(AppError::Auth(_))));
  }

  #[test]
  fn test_wrong_audience_is_rejected() {
    let mut other = AppConfig::for_tests();
    other.jwt_audience = "someone-else".into();
    let token = TokenService::from_config(&other).issue(&user()).unwrap();

    let service = TokenService::from_config(&AppConfig::for_tests());
    assert!(service.validate(&token).is_err());
  }

  #[test]
  fn test_garbage_is_rejected() {
    let service = TokenService::from_config(&AppConfig::for_tests());
    assert!(matches!(service.validate("not.a.jwt"), Err(AppError::Auth(_))));
  }
}
