//! Fetch executor: cache-first reads with request coalescing.
//!
//! 1. Fresh successful entry - return immediately, no network.
//! 2. Fetch already in flight for the key - join its shared future instead
//!    of issuing a second identical request.
//! 3. Otherwise - claim an in-flight token, run the fetcher (retrying once
//!    on transport failures), and apply the result to the store. The store
//!    discards the write if a newer fetch for the key has since claimed the
//!    token, so responses land in request-initiation order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ApiError;

use super::key::ResourceKey;
use super::policy::StalenessPolicy;
use super::store::{CacheEntry, CacheStore};

type FetchOutcome = std::result::Result<Value, ApiError>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// How a read should treat existing cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
  /// Serve fresh cache without a network call; join in-flight fetches.
  CacheFirst,
  /// The refetch affordance: always hit the network, superseding any fetch
  /// already in flight for the key.
  Force,
}

/// Issues fetches against the gateway on behalf of read queries.
///
/// The executor is the only writer of fetch results for any key; callers
/// observe state through store snapshots and subscriptions.
pub struct FetchExecutor {
  store: Arc<CacheStore>,
  policy: StalenessPolicy,
  in_flight: Mutex<HashMap<ResourceKey, SharedFetch>>,
}

impl FetchExecutor {
  pub fn new(store: Arc<CacheStore>, policy: StalenessPolicy) -> Self {
    Self {
      store,
      policy,
      in_flight: Mutex::new(HashMap::new()),
    }
  }

  pub fn store(&self) -> &Arc<CacheStore> {
    &self.store
  }

  /// Dispatch by mode; see `fetch` and `refetch`.
  pub async fn run<F, Fut>(&self, mode: FetchMode, key: &ResourceKey, fetcher: F) -> CacheEntry
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
  {
    match mode {
      FetchMode::CacheFirst => self.fetch(key, fetcher).await,
      FetchMode::Force => self.refetch(key, fetcher).await,
    }
  }

  /// Cache-first fetch. The fetcher is a factory so the retry path can
  /// produce a second attempt.
  pub async fn fetch<F, Fut>(&self, key: &ResourceKey, fetcher: F) -> CacheEntry
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
  {
    let entry = self.store.get(key);
    if entry.is_fresh(self.policy.max_age(key.kind)) {
      trace!(key = %key, "cache hit");
      return entry;
    }

    enum Path {
      Join(SharedFetch),
      Own(SharedFetch),
    }

    let path = {
      let mut in_flight = self.in_flight.lock().expect("in-flight map lock poisoned");
      match in_flight.get(key) {
        Some(existing) => {
          trace!(key = %key, "joining in-flight fetch");
          Path::Join(existing.clone())
        }
        None => {
          let shared = self.spawn_attempt(key, fetcher);
          in_flight.insert(key.clone(), shared.clone());
          Path::Own(shared)
        }
      }
    };

    match path {
      Path::Join(shared) => {
        let _ = shared.await;
      }
      Path::Own(shared) => {
        let _ = shared.clone().await;
        self.clear_in_flight(key, &shared);
      }
    }

    self.store.get(key)
  }

  /// Forced fetch: skips the freshness check and supersedes any fetch
  /// already in flight for the key, whose late result will be discarded.
  pub async fn refetch<F, Fut>(&self, key: &ResourceKey, fetcher: F) -> CacheEntry
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
  {
    let shared = {
      let mut in_flight = self.in_flight.lock().expect("in-flight map lock poisoned");
      let shared = self.spawn_attempt(key, fetcher);
      in_flight.insert(key.clone(), shared.clone());
      shared
    };

    let _ = shared.clone().await;
    self.clear_in_flight(key, &shared);
    self.store.get(key)
  }

  /// Build the shared attempt future. The in-flight token is claimed on
  /// first poll, which happens outside the in-flight map lock.
  fn spawn_attempt<F, Fut>(&self, key: &ResourceKey, fetcher: F) -> SharedFetch
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
  {
    let store = Arc::clone(&self.store);
    let key = key.clone();

    async move {
      let token = store.begin_fetch(&key);

      let mut result = fetcher().await;
      if let Err(err) = &result {
        if err.is_retryable() {
          debug!(key = %key, error = %err, "transport failure, retrying once");
          result = fetcher().await;
        }
      }

      store.apply_result(&key, token, result.clone());
      result
    }
    .boxed()
    .shared()
  }

  /// Drop the in-flight record, but only if it still refers to our attempt
  /// (a refetch may have replaced it).
  fn clear_in_flight(&self, key: &ResourceKey, shared: &SharedFetch) {
    let mut in_flight = self.in_flight.lock().expect("in-flight map lock poisoned");
    if let Some(current) = in_flight.get(key) {
      if Shared::ptr_eq(current, shared) {
        in_flight.remove(key);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::key::ResourceKind;
  use crate::error::ErrorKind;
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  use crate::cache::store::FetchStatus;

  fn executor() -> FetchExecutor {
    FetchExecutor::new(Arc::new(CacheStore::new()), StalenessPolicy::new())
  }

  fn branches_key() -> ResourceKey {
    ResourceKey::new(ResourceKind::RepoBranches, ["acme", "widgets"])
  }

  fn counting_fetcher(
    calls: Arc<AtomicUsize>,
    value: Value,
  ) -> impl Fn() -> futures::future::Ready<FetchOutcome> + Send + Sync + 'static {
    move || {
      calls.fetch_add(1, Ordering::SeqCst);
      futures::future::ready(Ok(value.clone()))
    }
  }

  #[tokio::test]
  async fn test_fresh_entry_is_a_cache_hit() {
    let exec = executor();
    let key = branches_key();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = exec.fetch(&key, counting_fetcher(calls.clone(), json!(["main"]))).await;
    let second = exec.fetch(&key, counting_fetcher(calls.clone(), json!(["main"]))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.status, FetchStatus::Success);
    assert_eq!(second.data, Some(json!(["main"])));
  }

  #[tokio::test]
  async fn test_concurrent_fetches_coalesce_into_one_call() {
    let exec = Arc::new(executor());
    let key = branches_key();
    let calls = Arc::new(AtomicUsize::new(0));

    let fetcher = {
      let calls = calls.clone();
      move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async {
          tokio::time::sleep(Duration::from_millis(20)).await;
          Ok(json!(["main", "dev"]))
        }
      }
    };

    let (a, b, c) = tokio::join!(
      exec.fetch(&key, fetcher.clone()),
      exec.fetch(&key, fetcher.clone()),
      exec.fetch(&key, fetcher.clone()),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for entry in [a, b, c] {
      assert_eq!(entry.data, Some(json!(["main", "dev"])));
    }
  }

  #[tokio::test]
  async fn test_network_failure_retried_exactly_once() {
    let exec = executor();
    let key = branches_key();
    let calls = Arc::new(AtomicUsize::new(0));

    let fetcher = {
      let calls = calls.clone();
      move || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(if attempt == 0 {
          Err(ApiError::new(ErrorKind::Network, "connection reset"))
        } else {
          Ok(json!(["main"]))
        })
      }
    };

    let entry = exec.fetch(&key, fetcher).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(entry.status, FetchStatus::Success);
  }

  #[tokio::test]
  async fn test_classified_failures_are_not_retried() {
    let exec = executor();
    let key = branches_key();
    let calls = Arc::new(AtomicUsize::new(0));

    let fetcher = {
      let calls = calls.clone();
      move || {
        calls.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(Err::<Value, _>(ApiError::from_status(422, "bad filter")))
      }
    };

    let entry = exec.fetch(&key, fetcher).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(entry.status, FetchStatus::Error);
    assert_eq!(entry.error.unwrap().kind, ErrorKind::Validation);
  }

  #[tokio::test]
  async fn test_later_fetch_wins_regardless_of_resolution_order() {
    let exec = Arc::new(executor());
    let key = branches_key();

    // First fetch resolves late with "old".
    let slow = {
      let exec = exec.clone();
      let key = key.clone();
      tokio::spawn(async move {
        exec
          .refetch(&key, || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(json!("old"))
          })
          .await
      })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;

    // Second fetch starts after the first and resolves before it.
    exec
      .refetch(&key, || async { Ok(json!("new")) })
      .await;

    slow.await.unwrap();

    assert_eq!(exec.store().get(&key).data, Some(json!("new")));
  }

  #[tokio::test]
  async fn test_stale_entry_triggers_refetch_on_next_access() {
    let exec = executor();
    let key = branches_key();
    let calls = Arc::new(AtomicUsize::new(0));

    exec.fetch(&key, counting_fetcher(calls.clone(), json!(["main"]))).await;
    exec
      .store()
      .invalidate(&crate::cache::key::KeyPrefix::new(
        ResourceKind::RepoBranches,
        ["acme", "widgets"],
      ));
    exec.fetch(&key, counting_fetcher(calls.clone(), json!(["main", "dev"]))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(exec.store().get(&key).data, Some(json!(["main", "dev"])));
  }

  #[tokio::test]
  async fn test_unsubscribed_listener_not_called_but_store_still_populated() {
    let exec = executor();
    let key = branches_key();
    let calls = Arc::new(AtomicUsize::new(0));

    let calls_clone = calls.clone();
    let id = exec.store().subscribe(&key, move |_| {
      calls_clone.fetch_add(1, Ordering::SeqCst);
    });
    exec.store().unsubscribe(&key, id);

    let entry = exec
      .fetch(&key, || futures::future::ready(Ok(json!(["main"]))))
      .await;

    assert_eq!(entry.status, FetchStatus::Success);
    assert_eq!(exec.store().get(&key).data, Some(json!(["main"])));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }
}
