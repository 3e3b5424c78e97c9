// apps/storefront/src/services/auth_service.rs

//! Password hashing and verification with Argon2.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password into a PHC string with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing failed: {}", argon_err))
    })
}

/// Returns `Ok(false)` on a mismatch; errors only when the stored hash is unusable.
#[instrument(
  name = "auth_service::verify_password",
  skip(stored_hash, provided_password),
  err(Display),
  fields(hash_len = stored_hash.len())
)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Stored password hash could not be parsed.");
    AppError::Internal(format!("Invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password mismatch.");
      Ok(false)
    }
    Err(other) => {
      error!(error = %other, "Argon2 password verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", other)))
    }
  }
}
