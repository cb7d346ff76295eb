//! Caching and synchronization core.
//!
//! The store is the single source of truth for fetched data; the fetch
//! executor, pagination cursors, debounce gate, and invalidation table
//! implement the policies that keep it correct under concurrent reads
//! and writes.

pub mod debounce;
pub mod fetch;
pub mod invalidate;
pub mod key;
pub mod pagination;
pub mod policy;
pub mod store;

pub use debounce::DebounceGate;
pub use fetch::{FetchExecutor, FetchMode};
pub use invalidate::{invalidation_targets, MutationKind};
pub use key::{KeyPrefix, ResourceKey, ResourceKind};
pub use pagination::{PageCursor, PageCursors, PageMeta};
pub use policy::StalenessPolicy;
pub use store::{CacheEntry, CacheStore, FetchStatus, SubscriptionId};
