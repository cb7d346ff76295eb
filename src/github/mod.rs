//! GitHub data layer: gateway client, normalized domain types, and the
//! read/write surfaces built on the cache.

pub mod api_types;
pub mod client;
pub mod mutations;
pub mod normalize;
pub mod queries;
pub mod types;

use std::sync::Arc;

use crate::cache::fetch::FetchExecutor;
use crate::cache::pagination::PageCursors;
use crate::cache::policy::StalenessPolicy;
use crate::cache::store::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::notify::Notifier;

pub use client::GatewayClient;
pub use mutations::{Mutation, Mutations};
pub use queries::{Queries, QuerySnapshot};

/// Entry point for embedding applications. Owns the cache store, the
/// fetch executor, and the read/write surfaces, all sharing one client.
pub struct GitHubData {
  store: Arc<CacheStore>,
  cursors: Arc<PageCursors>,
  queries: Queries,
  mutations: Mutations,
}

impl GitHubData {
  pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
    let client = GatewayClient::new(config)?;
    let store = Arc::new(CacheStore::new());
    let executor = Arc::new(FetchExecutor::new(store.clone(), StalenessPolicy::new()));
    let cursors = Arc::new(PageCursors::new());

    let queries = Queries::new(client.clone(), executor, cursors.clone());
    let mutations = Mutations::new(client, store.clone(), notifier);

    Ok(Self {
      store,
      cursors,
      queries,
      mutations,
    })
  }

  pub fn queries(&self) -> &Queries {
    &self.queries
  }

  pub fn mutations(&self) -> &Mutations {
    &self.mutations
  }

  pub fn store(&self) -> &Arc<CacheStore> {
    &self.store
  }

  pub fn cursors(&self) -> &Arc<PageCursors> {
    &self.cursors
  }
}
