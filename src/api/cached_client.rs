//! Fetch-with-cache primitive shared by the state components.

use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

use crate::cache::{CacheLayer, CacheStorage, QueryKey};

use super::client::Backend;
use super::request::{Endpoint, Request};

/// Backend client with transparent caching and a reactive loading flag.
///
/// Every state component owns one of these. The cache behind it is shared,
/// the loading flag is not.
pub struct CachedClient<B: Backend> {
  inner: B,
  cache: CacheLayer,
  loading: watch::Sender<bool>,
}

/// Clears the loading flag when dropped, on success and on error alike.
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl<'a> LoadingGuard<'a> {
  fn start(flag: &'a watch::Sender<bool>) -> Self {
    flag.send_replace(true);
    Self(flag)
  }
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    self.0.send_replace(false);
  }
}

impl<B: Backend> CachedClient<B> {
  pub fn new(inner: B, storage: Arc<dyn CacheStorage>) -> Self {
    let (loading, _) = watch::channel(false);
    Self {
      inner,
      cache: CacheLayer::new(storage),
      loading,
    }
  }

  /// Another client over the same backend and cache, with its own loading flag.
  pub fn sibling(&self) -> Self {
    let (loading, _) = watch::channel(false);
    Self {
      inner: self.inner.clone(),
      cache: self.cache.clone(),
      loading,
    }
  }

  pub fn loading(&self) -> bool {
    *self.loading.borrow()
  }

  pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
    self.loading.subscribe()
  }

  /// Fetch a response, replaying it from the cache when the same request was
  /// answered before.
  pub async fn fetch_with_cache<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
    let _loading = LoadingGuard::start(&self.loading);

    let result = self
      .cache
      .fetch(request, || self.inner.request(request))
      .await?;
    trace!(
      query = %request.description(),
      source = ?result.source,
      cached_at = ?result.cached_at,
      "response ready"
    );

    serde_json::from_value(result.data)
      .map_err(|e| eyre!("Failed to parse {}: {}", request.description(), e))
  }

  /// Fetch a response straight from the backend. Nothing is cached.
  pub async fn fetch_without_cache<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
    let _loading = LoadingGuard::start(&self.loading);

    let body = self.inner.request(request).await?;

    serde_json::from_value(body)
      .map_err(|e| eyre!("Failed to parse {}: {}", request.description(), e))
  }

  /// Drop every cached response.
  pub fn clear_cache(&self) -> Result<()> {
    self.cache.clear()
  }

  /// Drop the cached responses of the given endpoints.
  pub fn clear_cache_by_endpoint(&self, endpoints: &[Endpoint]) -> Result<usize> {
    let mut removed = 0;
    for endpoint in endpoints {
      removed += self.cache.invalidate(endpoint.name())?;
    }
    Ok(removed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{Employee, PaginatedResponse, Transaction};
  use crate::cache::MemoryStorage;
  use crate::testing::RecordingBackend;

  fn client(backend: &RecordingBackend) -> CachedClient<RecordingBackend> {
    CachedClient::new(backend.clone(), Arc::new(MemoryStorage::new()))
  }

  #[tokio::test]
  async fn test_repeated_request_hits_cache() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);

    let first: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();
    let second: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.calls(), vec![Request::Employees]);
  }

  #[tokio::test]
  async fn test_different_params_miss_cache() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);

    let _: Vec<Transaction> = client
      .fetch_with_cache(&Request::by_employee("4f6ea7c4"))
      .await
      .unwrap();
    let _: Vec<Transaction> = client
      .fetch_with_cache(&Request::by_employee("b7a5c0fe"))
      .await
      .unwrap();

    assert_eq!(backend.call_count(), 2);
  }

  #[tokio::test]
  async fn test_loading_cycles_on_cache_hit() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);
    let _: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();

    let mut loading = client.subscribe_loading();
    loading.mark_unchanged();

    let _: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();

    assert!(loading.has_changed().unwrap());
    assert!(!client.loading());
    assert_eq!(backend.call_count(), 1);
  }

  #[tokio::test]
  async fn test_failure_resets_loading_and_skips_cache() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);

    backend.fail_next();
    let result: Result<Vec<Employee>> = client.fetch_with_cache(&Request::Employees).await;
    assert!(result.is_err());
    assert!(!client.loading());

    let _: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();
    assert_eq!(backend.call_count(), 2);
  }

  #[tokio::test]
  async fn test_without_cache_always_requests() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);

    let _: PaginatedResponse<Vec<Transaction>> = client
      .fetch_without_cache(&Request::paginated(None))
      .await
      .unwrap();
    let _: PaginatedResponse<Vec<Transaction>> = client
      .fetch_with_cache(&Request::paginated(None))
      .await
      .unwrap();

    assert_eq!(backend.call_count(), 2);
  }

  #[tokio::test]
  async fn test_clear_by_endpoint_keeps_other_endpoints() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);

    let _: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();
    let _: PaginatedResponse<Vec<Transaction>> = client
      .fetch_with_cache(&Request::paginated(None))
      .await
      .unwrap();

    let removed = client
      .clear_cache_by_endpoint(&[Endpoint::PaginatedTransactions])
      .unwrap();
    assert_eq!(removed, 1);

    let _: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();
    let _: PaginatedResponse<Vec<Transaction>> = client
      .fetch_with_cache(&Request::paginated(None))
      .await
      .unwrap();

    assert_eq!(backend.call_count(), 3);
  }

  #[tokio::test]
  async fn test_siblings_share_cache_not_loading() {
    let backend = RecordingBackend::sample();
    let client = client(&backend);
    let sibling = client.sibling();

    let _: Vec<Employee> = client.fetch_with_cache(&Request::Employees).await.unwrap();
    let mut loading = client.subscribe_loading();
    loading.mark_unchanged();

    let _: Vec<Employee> = sibling.fetch_with_cache(&Request::Employees).await.unwrap();

    assert_eq!(backend.call_count(), 1);
    assert!(!loading.has_changed().unwrap());
  }
}
