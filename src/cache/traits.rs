//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use std::fmt;

/// Key under which a response body is cached.
///
/// The namespace groups every entry produced by one endpoint so that a whole
/// data set can be dropped at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub namespace: &'static str,
  pub hash: String,
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.namespace, self.hash)
  }
}

/// Trait for request descriptions that can be turned into cache keys.
///
/// Two values describing the same request (by value, not identity) must
/// produce equal keys.
pub trait QueryKey {
  /// Stable, fixed-length hash of the request parameters
  fn cache_hash(&self) -> String;

  /// Endpoint name the entry belongs to (e.g., "employees")
  fn namespace(&self) -> &'static str;

  /// Human readable description for logs
  fn description(&self) -> String;

  fn cache_key(&self) -> CacheKey {
    CacheKey {
      namespace: self.namespace(),
      hash: self.cache_hash(),
    }
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the backend
  Network,
  /// Replayed from the cache without a request
  Cache,
}
