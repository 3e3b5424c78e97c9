// apps/storefront/src/services/category_cache.rs

//! Cache-aside for the categories listing. One key, one-hour expiry, evicted
//! on every category or product write.

use crate::cache::CacheStore;
use crate::errors::Result;
use crate::models::CategoryWithProducts;
use crate::repos::CategoriesRepo;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub const CATEGORIES_CACHE_KEY: &str = "categories";
pub const CATEGORIES_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
  Cache,
  Database,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
  pub source: ListingSource,
  pub data: Vec<CategoryWithProducts>,
}

/// Serves from cache when possible. Cache faults degrade to a database read.
#[instrument(name = "category_cache::list", skip(cache, categories))]
pub async fn list_categories(cache: &dyn CacheStore, categories: &dyn CategoriesRepo) -> Result<CategoryListing> {
  match cache.get(CATEGORIES_CACHE_KEY).await {
    Ok(Some(raw)) => match serde_json::from_str::<Vec<CategoryWithProducts>>(&raw) {
      Ok(data) => {
        debug!(count = data.len(), "Categories served from cache.");
        return Ok(CategoryListing {
          source: ListingSource::Cache,
          data,
        });
      }
      Err(e) => warn!(error = %e, "Discarding unreadable categories cache entry."),
    },
    Ok(None) => debug!("Categories cache miss."),
    Err(e) => warn!(error = %e, "Categories cache read failed; falling back to database."),
  }

  let data = categories.list_with_products().await?;
  match serde_json::to_string(&data) {
    Ok(raw) => {
      if let Err(e) = cache.set_ex(CATEGORIES_CACHE_KEY, &raw, CATEGORIES_CACHE_TTL).await {
        error!(error = %e, "Failed to write categories cache.");
      }
    }
    Err(e) => error!(error = %e, "Failed to serialize categories for cache."),
  }

  Ok(CategoryListing {
    source: ListingSource::Database,
    data,
  })
}

/// Drops the cached listing; failures are logged, never returned.
pub async fn invalidate(cache: &dyn CacheStore) {
  match cache.delete(CATEGORIES_CACHE_KEY).await {
    Ok(()) => debug!("Categories cache evicted."),
    Err(e) => error!(error = %e, "Failed to evict categories cache."),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryCache;
  use crate::errors::AppError;
  use crate::repos::MemoryStore;
  use async_trait::async_trait;

  struct BrokenCache;

  #[async_trait]
  impl CacheStore for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
      Err(AppError::Cache("connection refused".into()))
    }
    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
      Err(AppError::Cache("connection refused".into()))
    }
    async fn delete(&self, _key: &str) -> Result<()> {
      Err(AppError::Cache("connection refused".into()))
    }
  }

  #[tokio::test]
  async fn test_miss_then_hit_then_eviction() {
    let cache = MemoryCache::default();
    let store = MemoryStore::default();
    store.create("Clothing").await.unwrap();

    let first = list_categories(&cache, &store).await.unwrap();
    assert_eq!(first.source, ListingSource::Database);
    let second = list_categories(&cache, &store).await.unwrap();
    assert_eq!(second.source, ListingSource::Cache);
    assert_eq!(second.data, first.data);

    store.create("Footwear").await.unwrap();
    invalidate(&cache).await;
    let third = list_categories(&cache, &store).await.unwrap();
    assert_eq!(third.source, ListingSource::Database);
    assert_eq!(third.data.len(), 2);
  }

  #[tokio::test]
  async fn test_corrupt_entry_falls_back_to_database() {
    let cache = MemoryCache::default();
    cache
      .set_ex(CATEGORIES_CACHE_KEY, "{not json", CATEGORIES_CACHE_TTL)
      .await
      .unwrap();
    let store = MemoryStore::default();

    let listing = list_categories(&cache, &store).await.unwrap();
    assert_eq!(listing.source, ListingSource::Database);
    assert_eq!(cache.get(CATEGORIES_CACHE_KEY).await.unwrap().as_deref(), Some("[]"));
  }

  #[tokio::test]
  async fn test_unavailable_cache_never_fails_the_read() {
    let store = MemoryStore::default();
    store.create("Electronics").await.unwrap();

    let listing = list_categories(&BrokenCache, &store).await.unwrap();
    assert_eq!(listing.source, ListingSource::Database);
    assert_eq!(listing.data[0].name, "Electronics");
    invalidate(&BrokenCache).await;
  }
}
