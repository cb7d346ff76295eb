//! octosync: the data synchronization and caching layer behind a GitHub
//! client.
//!
//! The crate sits between an embedding UI and an API gateway. Reads go
//! through [`github::Queries`], which serves fresh cache immediately,
//! coalesces identical in-flight requests, and revalidates stale entries
//! per resource kind. Writes go through [`github::Mutations`], which
//! reconcile the cache after each mutation by merging full-resource
//! responses and staling the declared dependent keys.
//!
//! ```no_run
//! use std::sync::Arc;
//! use octosync::cache::FetchMode;
//! use octosync::config::Config;
//! use octosync::github::GitHubData;
//! use octosync::notify::TracingNotifier;
//!
//! # async fn example() -> octosync::error::Result<()> {
//! let config = Config::load(None).map_err(|e| {
//!   octosync::error::ApiError::new(octosync::error::ErrorKind::Unknown, e.to_string())
//! })?;
//! let data = GitHubData::new(&config, Arc::new(TracingNotifier))?;
//! let repos = data
//!   .queries()
//!   .repositories("updated", FetchMode::CacheFirst)
//!   .await;
//! # let _ = repos;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod notify;
