//! Page cursors for paginated list resources.
//!
//! A page number belongs to one specific combination of the other list
//! parameters (branch filter, sort order, search text). Cursors therefore
//! track a fingerprint of those parameters and snap back to page 1 whenever
//! it changes. `has_more` comes exclusively from server pagination
//! metadata; inferring it from `items.len() == per_page` is wrong whenever
//! the total count is an exact multiple of the page size.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::trace;

use super::key::ResourceKey;

pub const DEFAULT_PER_PAGE: u32 = 20;

/// Server-provided pagination metadata for one list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
  pub page: u32,
  pub per_page: u32,
  pub has_more: bool,
}

/// Cursor state for one list identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
  pub page: u32,
  pub per_page: u32,
  pub has_more: bool,
}

impl PageCursor {
  fn first() -> Self {
    Self {
      page: 1,
      per_page: DEFAULT_PER_PAGE,
      has_more: false,
    }
  }
}

struct CursorState {
  cursor: PageCursor,
  /// Joined non-page parameters the current page number belongs to
  fingerprint: String,
}

/// Tracks page cursors per list identity (the resource key minus its page
/// parameters, e.g. `(RepoCommits, owner, repo)`).
pub struct PageCursors {
  inner: Mutex<HashMap<ResourceKey, CursorState>>,
}

impl PageCursors {
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(HashMap::new()),
    }
  }

  /// Current cursor for a list, created at page 1 on first use.
  pub fn cursor(&self, id: &ResourceKey) -> PageCursor {
    let inner = self.inner.lock().expect("cursor map lock poisoned");
    inner.get(id).map(|s| s.cursor).unwrap_or_else(PageCursor::first)
  }

  /// Reconcile the cursor with the list's current non-page parameters.
  ///
  /// If the fingerprint changed since the last fetch, the page number is
  /// meaningless and resets to 1. Returns the cursor to fetch with.
  pub fn sync_params(&self, id: &ResourceKey, fingerprint: &str) -> PageCursor {
    let mut inner = self.inner.lock().expect("cursor map lock poisoned");
    let state = inner.entry(id.clone()).or_insert_with(|| CursorState {
      cursor: PageCursor::first(),
      fingerprint: fingerprint.to_string(),
    });

    if state.fingerprint != fingerprint {
      trace!(key = %id, "list parameters changed, resetting to page 1");
      state.fingerprint = fingerprint.to_string();
      state.cursor.page = 1;
      state.cursor.has_more = false;
    }
    state.cursor
  }

  /// Record the server's pagination metadata after a page fetch. This is
  /// the only place `has_more` is ever written.
  pub fn record_meta(&self, id: &ResourceKey, meta: PageMeta) {
    let mut inner = self.inner.lock().expect("cursor map lock poisoned");
    let state = inner.entry(id.clone()).or_insert_with(|| CursorState {
      cursor: PageCursor::first(),
      fingerprint: String::new(),
    });
    state.cursor.page = meta.page;
    state.cursor.per_page = meta.per_page;
    state.cursor.has_more = meta.has_more;
  }

  /// Advance to the next page if the server said one exists.
  pub fn next_page(&self, id: &ResourceKey) -> PageCursor {
    let mut inner = self.inner.lock().expect("cursor map lock poisoned");
    let state = inner.entry(id.clone()).or_insert_with(|| CursorState {
      cursor: PageCursor::first(),
      fingerprint: String::new(),
    });
    if state.cursor.has_more {
      state.cursor.page += 1;
    }
    state.cursor
  }

  /// Step back one page, never below 1.
  pub fn prev_page(&self, id: &ResourceKey) -> PageCursor {
    let mut inner = self.inner.lock().expect("cursor map lock poisoned");
    let state = inner.entry(id.clone()).or_insert_with(|| CursorState {
      cursor: PageCursor::first(),
      fingerprint: String::new(),
    });
    state.cursor.page = state.cursor.page.saturating_sub(1).max(1);
    state.cursor
  }

  /// Reset a list back to page 1.
  pub fn reset(&self, id: &ResourceKey) {
    let mut inner = self.inner.lock().expect("cursor map lock poisoned");
    if let Some(state) = inner.get_mut(id) {
      state.cursor.page = 1;
      state.cursor.has_more = false;
    }
  }
}

impl Default for PageCursors {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::key::ResourceKind;

  fn commits_id() -> ResourceKey {
    ResourceKey::new(ResourceKind::RepoCommits, ["acme", "widgets"])
  }

  #[test]
  fn test_next_page_after_server_says_has_more() {
    let cursors = PageCursors::new();
    let id = commits_id();

    // Page 1 fetched, server reports more pages.
    cursors.record_meta(
      &id,
      PageMeta {
        page: 1,
        per_page: 20,
        has_more: true,
      },
    );
    let cursor = cursors.next_page(&id);

    assert_eq!(cursor.page, 2);
    assert_eq!(cursors.cursor(&id).page, 2);
  }

  #[test]
  fn test_next_page_is_noop_on_last_page() {
    let cursors = PageCursors::new();
    let id = commits_id();

    cursors.record_meta(
      &id,
      PageMeta {
        page: 3,
        per_page: 20,
        has_more: false,
      },
    );

    assert_eq!(cursors.next_page(&id).page, 3);
  }

  #[test]
  fn test_changing_non_page_param_resets_to_page_1() {
    let cursors = PageCursors::new();
    let id = commits_id();

    cursors.sync_params(&id, "ref=main");
    cursors.record_meta(
      &id,
      PageMeta {
        page: 4,
        per_page: 20,
        has_more: true,
      },
    );

    // Same params: page survives.
    assert_eq!(cursors.sync_params(&id, "ref=main").page, 4);

    // Branch filter changed: page number is meaningless, reset.
    let cursor = cursors.sync_params(&id, "ref=dev");
    assert_eq!(cursor.page, 1);
    assert!(!cursor.has_more);
  }

  #[test]
  fn test_prev_page_floors_at_1() {
    let cursors = PageCursors::new();
    let id = commits_id();

    assert_eq!(cursors.prev_page(&id).page, 1);

    cursors.record_meta(
      &id,
      PageMeta {
        page: 2,
        per_page: 20,
        has_more: true,
      },
    );
    assert_eq!(cursors.prev_page(&id).page, 1);
    assert_eq!(cursors.prev_page(&id).page, 1);
  }

  #[test]
  fn test_reset_returns_to_first_page() {
    let cursors = PageCursors::new();
    let id = commits_id();

    cursors.record_meta(
      &id,
      PageMeta {
        page: 7,
        per_page: 50,
        has_more: true,
      },
    );
    cursors.reset(&id);

    let cursor = cursors.cursor(&id);
    assert_eq!(cursor.page, 1);
    assert!(!cursor.has_more);
    // per_page is a display preference, reset leaves it alone.
    assert_eq!(cursor.per_page, 50);
  }
}
