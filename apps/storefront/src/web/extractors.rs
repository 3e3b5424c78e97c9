// apps/storefront/src/web/extractors.rs

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::models::Role;
use crate::state::AppState;

/// Caller identity taken from a valid `Authorization: Bearer` token.
/// Extraction fails with 401 when the header is missing or the token is bad.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: i32,
  pub email: String,
  pub role: Role,
}

impl AuthenticatedUser {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&self.role) {
      Ok(())
    } else {
      warn!(user_id = self.user_id, role = %self.role, "Role not permitted for this endpoint.");
      Err(AppError::Forbidden("Insufficient role for this operation.".to_string()))
    }
  }

  pub fn require_admin(&self) -> Result<(), AppError> {
    self.require_role(&[Role::Admin])
  }

  /// Lets a user act on their own resources and an admin act on anyone's.
  pub fn require_self_or_admin(&self, user_id: i32) -> Result<(), AppError> {
    if self.is_admin() || self.user_id == user_id {
      Ok(())
    } else {
      warn!(caller = self.user_id, target = user_id, "Access to another user's resource denied.");
      Err(AppError::Forbidden("You can only access your own resources.".to_string()))
    }
  }

  fn from_headers(req: &HttpRequest) -> Result<Self, AppError> {
    let state = req
      .app_data::<web::Data<AppState>>()
      .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

    let token = req
      .headers()
      .get(header::AUTHORIZATION)
      .and_then(|h| h.to_str().ok())
      .and_then(|h| h.strip_prefix("Bearer "))
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .ok_or_else(|| AppError::Auth("Bearer token required.".to_string()))?;

    let identity = state.tokens.validate(token)?;
    Ok(AuthenticatedUser {
      user_id: identity.user_id,
      email: identity.email,
      role: identity.role,
    })
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(Self::from_headers(req))
  }
}
