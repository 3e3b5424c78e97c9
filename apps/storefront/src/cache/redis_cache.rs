// apps/storefront/src/cache/redis_cache.rs

use super::CacheStore;
use crate::errors::Result;
use async_trait::async_trait;
use redis::{
  aio::{ConnectionManager, ConnectionManagerConfig},
  AsyncCommands, Client,
};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct RedisCache {
  connection: ConnectionManager,
}

impl RedisCache {
  #[instrument(name = "redis_cache::connect", skip(redis_url))]
  pub async fn connect(redis_url: &str) -> Result<Self> {
    let config = ConnectionManagerConfig::new()
      .set_number_of_retries(1)
      .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection = client.get_connection_manager_with_config(config).await?;
    info!("Connected to Redis.");
    Ok(Self { connection })
  }
}

#[async_trait]
impl CacheStore for RedisCache {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    let mut conn = self.connection.clone();
    Ok(conn.get::<_, Option<String>>(key).await?)
  }

  async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
    let mut conn = self.connection.clone();
    conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<()> {
    let mut conn = self.connection.clone();
    conn.del::<_, ()>(key).await?;
    Ok(())
  }
}
