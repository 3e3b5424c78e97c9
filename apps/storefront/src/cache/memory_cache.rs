// apps/storefront/src/cache/memory_cache.rs

use super::CacheStore;
use crate::errors::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// In-process stand-in for Redis. Expired entries are dropped on read.
#[derive(Default)]
pub struct MemoryCache {
  entries: Mutex<HashMap<String, (String, Instant)>>,
}

#[async_trait]
impl CacheStore for MemoryCache {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    let mut entries = self.entries.lock();
    match entries.get(key) {
      Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
      Some(_) => {
        entries.remove(key);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
    self
      .entries
      .lock()
      .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<()> {
    self.entries.lock().remove(key);
    Ok(())
  }
}
