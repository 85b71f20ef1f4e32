//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::CacheKey;

/// A single cached response body.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry {
  /// The response body as received
  pub value: Value,
  /// When the entry was stored
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Entries never expire on their own; they live until removed explicitly.
pub trait CacheStorage: Send + Sync {
  /// Get the entry stored under a key.
  fn get(&self, key: &CacheKey) -> Result<Option<CachedEntry>>;

  /// Store a response body, replacing any previous entry.
  fn set(&self, key: CacheKey, value: Value) -> Result<()>;

  /// Check whether a key is present.
  fn has(&self, key: &CacheKey) -> Result<bool>;

  /// Remove every entry in a namespace, returning how many were dropped.
  fn remove_namespace(&self, namespace: &str) -> Result<usize>;

  /// Remove everything.
  fn clear(&self) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &CacheKey) -> Result<Option<CachedEntry>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: CacheKey, _value: Value) -> Result<()> {
    Ok(()) // Discard
  }

  fn has(&self, _key: &CacheKey) -> Result<bool> {
    Ok(false)
  }

  fn remove_namespace(&self, _namespace: &str) -> Result<usize> {
    Ok(0)
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }
}

/// Process-wide in-memory storage.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<CacheKey, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<CacheKey, CachedEntry>>> {
    self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Number of stored entries.
  #[cfg(test)]
  pub fn len(&self) -> Result<usize> {
    Ok(self.lock()?.len())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &CacheKey) -> Result<Option<CachedEntry>> {
    Ok(self.lock()?.get(key).cloned())
  }

  fn set(&self, key: CacheKey, value: Value) -> Result<()> {
    let entry = CachedEntry {
      value,
      cached_at: Utc::now(),
    };
    self.lock()?.insert(key, entry);
    Ok(())
  }

  fn has(&self, key: &CacheKey) -> Result<bool> {
    Ok(self.lock()?.contains_key(key))
  }

  fn remove_namespace(&self, namespace: &str) -> Result<usize> {
    let mut entries = self.lock()?;
    let before = entries.len();
    entries.retain(|key, _| key.namespace != namespace);
    Ok(before - entries.len())
  }

  fn clear(&self) -> Result<()> {
    self.lock()?.clear();
    Ok(())
  }
}
