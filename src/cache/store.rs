//! In-memory cache store: the single piece of mutable shared state.
//!
//! Maps resource keys to entries, hands out snapshots, and notifies
//! subscribers on every write. All mutation goes through `set` (or the
//! fetch-transition helpers built on it) under one mutex, so writes are
//! synchronous and last-write-wins. Stale-response suppression is handled
//! by the in-flight token: a fetch result is only applied while its token
//! is still the current one for the key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ApiError;

use super::key::{KeyPrefix, ResourceKey};

/// Fetch lifecycle state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
  /// Entry exists but nothing has been fetched yet
  Idle,
  /// A fetch is in flight (possibly with stale data still present)
  Loading,
  /// Last fetch succeeded
  Success,
  /// Last fetch failed
  Error,
}

/// Snapshot of one cached resource.
///
/// Owned exclusively by the store; readers get clones and never mutate
/// shared state directly.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  /// Normalized value, kept across invalidation for stale-while-revalidate
  pub data: Option<Value>,
  pub status: FetchStatus,
  pub fetched_at: Option<DateTime<Utc>>,
  pub error: Option<ApiError>,
  /// Marked by the invalidation engine; forces a refetch on next access
  pub stale: bool,
  /// Token of the current in-flight fetch, for dedup and ordering
  pub(crate) in_flight: Option<u64>,
}

impl CacheEntry {
  fn idle() -> Self {
    Self {
      data: None,
      status: FetchStatus::Idle,
      fetched_at: None,
      error: None,
      stale: false,
      in_flight: None,
    }
  }

  /// Whether this entry can satisfy a read without a network call.
  pub fn is_fresh(&self, max_age: Duration) -> bool {
    if self.status != FetchStatus::Success || self.stale {
      return false;
    }
    match self.fetched_at {
      Some(at) => Utc::now() - at < max_age,
      None => false,
    }
  }

  /// Deserialize the stored value into its domain type.
  pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
    self
      .data
      .as_ref()
      .and_then(|v| serde_json::from_value(v.clone()).ok())
  }
}

type Listener = Arc<dyn Fn(&CacheEntry) + Send + Sync>;

struct EntryState {
  entry: CacheEntry,
  listeners: HashMap<u64, Listener>,
  /// When the entry was last marked stale, for the GC grace period
  staled_at: Option<DateTime<Utc>>,
}

impl EntryState {
  fn new() -> Self {
    Self {
      entry: CacheEntry::idle(),
      listeners: HashMap::new(),
      staled_at: None,
    }
  }
}

struct Inner {
  entries: HashMap<ResourceKey, EntryState>,
  next_listener_id: u64,
  next_token: u64,
}

/// Identifier returned by `subscribe`, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// The cache store. Explicitly constructed and passed to consumers;
/// dropping it is disposal. There is no global instance.
pub struct CacheStore {
  inner: Mutex<Inner>,
}

impl CacheStore {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        entries: HashMap::new(),
        next_listener_id: 0,
        next_token: 0,
      }),
    }
  }

  /// Snapshot of the entry for a key. Absent keys read as idle.
  pub fn get(&self, key: &ResourceKey) -> CacheEntry {
    let inner = self.inner.lock().expect("cache store lock poisoned");
    inner
      .entries
      .get(key)
      .map(|s| s.entry.clone())
      .unwrap_or_else(CacheEntry::idle)
  }

  /// Apply a mutation to the entry for a key and notify its subscribers.
  ///
  /// This is the only path that touches entry state. Listeners are invoked
  /// after the lock is released so they may read the store.
  pub fn set<F>(&self, key: &ResourceKey, update: F)
  where
    F: FnOnce(&mut CacheEntry),
  {
    let (snapshot, listeners) = {
      let mut inner = self.inner.lock().expect("cache store lock poisoned");
      let state = inner.entries.entry(key.clone()).or_insert_with(EntryState::new);
      update(&mut state.entry);
      let listeners: Vec<Listener> = state.listeners.values().cloned().collect();
      (state.entry.clone(), listeners)
    };

    for listener in listeners {
      listener(&snapshot);
    }
  }

  /// Register a listener for writes to a key.
  ///
  /// The listener is called synchronously after every `set` on the key.
  /// Unsubscribing never blocks an in-flight fetch from populating the
  /// store; it only stops callbacks for this listener.
  pub fn subscribe<F>(&self, key: &ResourceKey, listener: F) -> SubscriptionId
  where
    F: Fn(&CacheEntry) + Send + Sync + 'static,
  {
    let mut inner = self.inner.lock().expect("cache store lock poisoned");
    inner.next_listener_id += 1;
    let id = inner.next_listener_id;
    let state = inner.entries.entry(key.clone()).or_insert_with(EntryState::new);
    state.listeners.insert(id, Arc::new(listener));
    SubscriptionId(id)
  }

  /// Remove a listener. Synchronous; safe to call from a listener teardown.
  pub fn unsubscribe(&self, key: &ResourceKey, id: SubscriptionId) {
    let mut inner = self.inner.lock().expect("cache store lock poisoned");
    if let Some(state) = inner.entries.get_mut(key) {
      state.listeners.remove(&id.0);
    }
  }

  /// Number of live subscribers for a key.
  pub fn subscriber_count(&self, key: &ResourceKey) -> usize {
    let inner = self.inner.lock().expect("cache store lock poisoned");
    inner.entries.get(key).map(|s| s.listeners.len()).unwrap_or(0)
  }

  /// Mark every entry under a prefix stale, keeping its data so the UI can
  /// keep rendering while the next read revalidates. Returns how many
  /// entries were hit.
  pub fn invalidate(&self, prefix: &KeyPrefix) -> usize {
    let now = Utc::now();
    let notifications = {
      let mut inner = self.inner.lock().expect("cache store lock poisoned");
      let mut hit: Vec<(CacheEntry, Vec<Listener>)> = Vec::new();

      for (key, state) in inner.entries.iter_mut() {
        if !key.matches(prefix) {
          continue;
        }
        state.entry.stale = true;
        state.staled_at = Some(now);
        hit.push((
          state.entry.clone(),
          state.listeners.values().cloned().collect(),
        ));
      }
      hit
    };

    let count = notifications.len();
    if count > 0 {
      debug!(prefix = %prefix, entries = count, "invalidated cache entries");
    }
    for (snapshot, listeners) in notifications {
      for listener in listeners {
        listener(&snapshot);
      }
    }
    count
  }

  /// Begin a fetch: transition to Loading and claim a fresh in-flight
  /// token. Any earlier fetch for the key is superseded: its result will
  /// fail the token check in `apply_result` and be discarded.
  pub(crate) fn begin_fetch(&self, key: &ResourceKey) -> u64 {
    let token = {
      let mut inner = self.inner.lock().expect("cache store lock poisoned");
      inner.next_token += 1;
      inner.next_token
    };

    self.set(key, |entry| {
      entry.status = FetchStatus::Loading;
      entry.in_flight = Some(token);
    });

    trace!(key = %key, token, "fetch started");
    token
  }

  /// Apply a resolved fetch, but only if `token` is still current for the
  /// key. Returns false when the write was discarded because a newer fetch
  /// has since started. This is what keeps responses applied in
  /// request-initiation order.
  pub(crate) fn apply_result(
    &self,
    key: &ResourceKey,
    token: u64,
    result: std::result::Result<Value, ApiError>,
  ) -> bool {
    {
      let inner = self.inner.lock().expect("cache store lock poisoned");
      let current = inner.entries.get(key).and_then(|s| s.entry.in_flight);
      if current != Some(token) {
        debug!(key = %key, token, "discarding superseded fetch result");
        return false;
      }
    }

    match result {
      Ok(data) => self.set(key, |entry| {
        entry.data = Some(data);
        entry.status = FetchStatus::Success;
        entry.fetched_at = Some(Utc::now());
        entry.error = None;
        entry.stale = false;
        entry.in_flight = None;
      }),
      Err(err) => self.set(key, |entry| {
        entry.status = FetchStatus::Error;
        entry.error = Some(err);
        entry.in_flight = None;
      }),
    }
    true
  }

  /// Advisory garbage collection: drop entries that have no subscribers
  /// and have been stale longer than the grace period. Correctness never
  /// depends on this running.
  pub fn gc(&self, grace: Duration) -> usize {
    let now = Utc::now();
    let mut inner = self.inner.lock().expect("cache store lock poisoned");
    let before = inner.entries.len();
    inner.entries.retain(|_, state| {
      if !state.listeners.is_empty() || state.entry.in_flight.is_some() {
        return true;
      }
      match state.staled_at {
        Some(at) if state.entry.stale => now - at <= grace,
        _ => true,
      }
    });
    before - inner.entries.len()
  }

  /// Number of cached entries (tests and diagnostics).
  pub fn len(&self) -> usize {
    let inner = self.inner.lock().expect("cache store lock poisoned");
    inner.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for CacheStore {
  fn default() -> Self {
    Self::new()
  }
}
