// apps/storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

const DEV_JWT_SECRET: &str = "storefront-development-secret-change-me-before-deploying-anywhere";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` selects the in-memory store.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  /// `None` selects the in-process cache.
  pub redis_url: Option<String>,

  pub jwt_secret: String,
  pub jwt_issuer: String,
  pub jwt_audience: String,
  pub jwt_expiry_minutes: i64,

  pub chat_endpoint: String,
  pub chat_model: String,

  pub cors_allowed_origin: String,

  pub seed_db: bool,
  pub seed_user_count: usize,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let opt_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let database_url = opt_env("DATABASE_URL");
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let redis_url = opt_env("REDIS_URL");

    let jwt_secret = match (opt_env("JWT_SECRET"), &database_url) {
      (Some(secret), _) => secret,
      (None, Some(_)) => {
        return Err(AppError::Config(
          "JWT_SECRET must be set when DATABASE_URL is configured.".to_string(),
        ))
      }
      (None, None) => {
        tracing::warn!("JWT_SECRET not set; using the built-in development secret.");
        DEV_JWT_SECRET.to_string()
      }
    };
    let jwt_issuer = get_env("JWT_ISSUER").unwrap_or_else(|_| "storefront".to_string());
    let jwt_audience = get_env("JWT_AUDIENCE").unwrap_or_else(|_| "storefront-spa".to_string());
    let jwt_expiry_minutes = get_env("JWT_EXPIRY_MINUTES")
      .unwrap_or_else(|_| "60".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid JWT_EXPIRY_MINUTES: {}", e)))?;
    if jwt_expiry_minutes <= 0 {
      return Err(AppError::Config("JWT_EXPIRY_MINUTES must be positive.".to_string()));
    }

    let chat_endpoint = get_env("CHAT_ENDPOINT").unwrap_or_else(|_| "http://localhost:11434/api/generate".to_string());
    let chat_model = get_env("CHAT_MODEL").unwrap_or_else(|_| "llama3".to_string());

    let cors_allowed_origin = get_env("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;
    let seed_user_count = get_env("SEED_USER_COUNT")
      .unwrap_or_else(|_| "50".to_string())
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_USER_COUNT: {}", e)))?;

    tracing::info!(
      in_memory_store = database_url.is_none(),
      in_process_cache = redis_url.is_none(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      redis_url,
      jwt_secret,
      jwt_issuer,
      jwt_audience,
      jwt_expiry_minutes,
      chat_endpoint,
      chat_model,
      cors_allowed_origin,
      seed_db,
      seed_user_count,
    })
  }

  /// Settings for tests and local runs without any backing services.
  pub fn for_tests() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: None,
      database_max_connections: 1,
      redis_url: None,
      jwt_secret: DEV_JWT_SECRET.to_string(),
      jwt_issuer: "storefront".to_string(),
      jwt_audience: "storefront-spa".to_string(),
      jwt_expiry_minutes: 60,
      chat_endpoint: "http://127.0.0.1:9/api/generate".to_string(),
      chat_model: "llama3".to_string(),
      cors_allowed_origin: "http://localhost:5173".to_string(),
      seed_db: false,
      seed_user_count: 0,
    }
  }
}
