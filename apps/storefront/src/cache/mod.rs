// apps/storefront/src/cache/mod.rs

//! String key-value cache with per-entry expiry.

use crate::errors::Result;
use async_trait::async_trait;
use std::time::Duration;

pub mod memory_cache;
pub mod redis_cache;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;

#[async_trait]
pub trait CacheStore: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>>;
  async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
  async fn delete(&self, key: &str) -> Result<()>;
}
