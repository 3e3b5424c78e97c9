// apps/storefront/src/state.rs

use crate::cache::{CacheStore, MemoryCache, RedisCache};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::repos::Repos;
use crate::services::{seeder, token_service::TokenService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use storeflow::Registry;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
  pub repos: Repos,
  pub cache: Arc<dyn CacheStore>,
  pub flows: Arc<Registry<AppError>>,
  pub tokens: Arc<TokenService>,
  pub http: reqwest::Client,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the shared services and registers every pipeline.
  pub fn build(config: AppConfig, repos: Repos, cache: Arc<dyn CacheStore>) -> Result<Self> {
    let http = reqwest::Client::builder()
      .connect_timeout(Duration::from_secs(5))
      .build()
      .map_err(|e| AppError::Config(format!("HTTP client setup failed: {}", e)))?;

    let state = AppState {
      repos,
      cache,
      flows: Arc::new(Registry::new()),
      tokens: Arc::new(TokenService::from_config(&config)),
      http,
      config: Arc::new(config),
    };
    pipelines::register_all_pipelines(&state.flows);
    Ok(state)
  }

  /// Connects to whatever backends the configuration names, falling back to
  /// in-process ones, runs migrations and optional seeding.
  pub async fn connect(config: AppConfig) -> Result<Self> {
    let repos = match &config.database_url {
      Some(url) => {
        let pool = PgPoolOptions::new()
          .max_connections(config.database_max_connections)
          .connect(url)
          .await?;
        info!("Successfully connected to the database.");
        sqlx::migrate!("./migrations")
          .run(&pool)
          .await
          .map_err(|e| AppError::Internal(format!("Database migration failed: {}", e)))?;
        info!("Database migrations applied.");
        Repos::postgres(pool)
      }
      None => {
        warn!("DATABASE_URL not set; using the in-memory store. Data is lost on restart.");
        Repos::in_memory()
      }
    };

    let cache: Arc<dyn CacheStore> = match &config.redis_url {
      Some(url) => Arc::new(RedisCache::connect(url).await?),
      None => {
        warn!("REDIS_URL not set; using the in-process cache.");
        Arc::new(MemoryCache::default())
      }
    };

    if config.seed_db {
      seeder::seed(&repos, config.seed_user_count).await?;
    }

    Self::build(config, repos, cache)
  }

  /// Memory store and in-process cache; no external services needed.
  pub fn in_memory(config: AppConfig) -> Result<Self> {
    Self::build(config, Repos::in_memory(), Arc::new(MemoryCache::default()))
  }
}
