//! Staleness policy: how long cached data stays fresh per resource kind.

use chrono::Duration;

use super::key::ResourceKind;

/// Maximum-age windows per resource kind.
///
/// An entry is fresh while `now - fetched_at < max_age(kind)`; past that it
/// is stale and eligible for refetch on next access. Stale data is still
/// served while a refetch runs (stale-while-revalidate).
#[derive(Debug, Clone)]
pub struct StalenessPolicy {
  default_max_age: Duration,
  search_max_age: Duration,
  slow_moving_max_age: Duration,
}

impl StalenessPolicy {
  pub fn new() -> Self {
    Self {
      default_max_age: Duration::minutes(2),
      search_max_age: Duration::seconds(30),
      slow_moving_max_age: Duration::minutes(10),
    }
  }

  /// Maximum age before an entry of this kind counts as stale.
  pub fn max_age(&self, kind: ResourceKind) -> Duration {
    if kind.is_search() {
      return self.search_max_age;
    }

    match kind {
      // Profile-ish data and small per-repo dictionaries change rarely.
      ResourceKind::UserProfile | ResourceKind::UserOrgs => self.slow_moving_max_age,
      ResourceKind::RepoBranches
      | ResourceKind::RepoLabels
      | ResourceKind::RepoLanguages
      | ResourceKind::RepoTags => Duration::minutes(5),
      _ => self.default_max_age,
    }
  }
}

impl Default for StalenessPolicy {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_search_window_is_short() {
    let policy = StalenessPolicy::new();
    assert_eq!(policy.max_age(ResourceKind::SearchRepos), Duration::seconds(30));
    assert_eq!(policy.max_age(ResourceKind::SearchCode), Duration::seconds(30));
  }

  #[test]
  fn test_slow_moving_kinds_get_long_windows() {
    let policy = StalenessPolicy::new();
    assert_eq!(policy.max_age(ResourceKind::UserProfile), Duration::minutes(10));
    assert_eq!(policy.max_age(ResourceKind::RepoBranches), Duration::minutes(5));
    assert_eq!(policy.max_age(ResourceKind::RepoLabels), Duration::minutes(5));
  }

  #[test]
  fn test_default_window() {
    let policy = StalenessPolicy::new();
    assert_eq!(policy.max_age(ResourceKind::RepoCommits), Duration::minutes(2));
    assert_eq!(policy.max_age(ResourceKind::Notifications), Duration::minutes(2));
  }
}
