//! Cache layer that orchestrates caching logic with network fetching.

use color_eyre::Result;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::storage::CacheStorage;
use super::traits::{CacheResult, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the state components and the backend. Entries are
/// shared by every clone of the layer.
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
}

impl CacheLayer {
  /// Create a new cache layer over the given storage backend.
  pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
    Self { storage }
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Check cache - if present, return it without calling `fetcher`
  /// 2. If missing, fetch from the backend
  /// 3. Store the body only when the fetch succeeded
  pub async fn fetch<K, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<Value>>
  where
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
  {
    let cache_key = key.cache_key();

    if let Some(cached) = self.storage.get(&cache_key)? {
      debug!(query = %key.description(), "cache hit");
      return Ok(CacheResult::from_cache(cached.value, cached.cached_at));
    }

    debug!(query = %key.description(), "cache miss");
    let data = fetcher().await?;
    self.storage.set(cache_key, data.clone())?;
    Ok(CacheResult::from_network(data))
  }

  /// Drop every entry cached for one endpoint.
  pub fn invalidate(&self, namespace: &str) -> Result<usize> {
    let removed = self.storage.remove_namespace(namespace)?;
    debug!(namespace, removed, "invalidated cache namespace");
    Ok(removed)
  }

  /// Drop every entry.
  pub fn clear(&self) -> Result<()> {
    debug!("cleared cache");
    self.storage.clear()
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
