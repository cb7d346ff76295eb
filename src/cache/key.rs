//! Resource keys: how every cacheable unit of data is identified.
//!
//! A key is an ordered tuple of resource kind plus parameters, e.g.
//! `(RepoCommits, owner, repo, page, per_page, ref)`. Two keys are equal
//! iff their tuples are deeply equal. Invalidation works on key prefixes:
//! invalidating `(RepoCommits, owner, repo)` hits every key whose tuple
//! starts with that prefix, whatever page or ref it carries.

use std::fmt;

/// Every cacheable resource type the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Repos,
  RepoDetails,
  RepoCommits,
  CommitDetail,
  RepoBranches,
  RepoIssues,
  IssueDetail,
  IssueComments,
  RepoPulls,
  PullDetail,
  PullFiles,
  RepoReleases,
  ReleaseDetail,
  RepoCollaborators,
  RepoLabels,
  RepoMilestones,
  RepoTags,
  RepoContributors,
  RepoLanguages,
  RepoReadme,
  Notifications,
  UserProfile,
  UserOrgs,
  SearchRepos,
  SearchIssues,
  SearchUsers,
  SearchCode,
}

impl ResourceKind {
  /// Stable name used in cache key display and log fields.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Repos => "repos",
      Self::RepoDetails => "repo_details",
      Self::RepoCommits => "repo_commits",
      Self::CommitDetail => "commit_detail",
      Self::RepoBranches => "repo_branches",
      Self::RepoIssues => "repo_issues",
      Self::IssueDetail => "issue_detail",
      Self::IssueComments => "issue_comments",
      Self::RepoPulls => "repo_pulls",
      Self::PullDetail => "pull_detail",
      Self::PullFiles => "pull_files",
      Self::RepoReleases => "repo_releases",
      Self::ReleaseDetail => "release_detail",
      Self::RepoCollaborators => "repo_collaborators",
      Self::RepoLabels => "repo_labels",
      Self::RepoMilestones => "repo_milestones",
      Self::RepoTags => "repo_tags",
      Self::RepoContributors => "repo_contributors",
      Self::RepoLanguages => "repo_languages",
      Self::RepoReadme => "repo_readme",
      Self::Notifications => "notifications",
      Self::UserProfile => "user_profile",
      Self::UserOrgs => "user_orgs",
      Self::SearchRepos => "search_repos",
      Self::SearchIssues => "search_issues",
      Self::SearchUsers => "search_users",
      Self::SearchCode => "search_code",
    }
  }

  /// Whether this kind is a search result set (short staleness window).
  pub fn is_search(&self) -> bool {
    matches!(
      self,
      Self::SearchRepos | Self::SearchIssues | Self::SearchUsers | Self::SearchCode
    )
  }
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Composite identifier for one cacheable resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
  pub kind: ResourceKind,
  pub params: Vec<String>,
}

impl ResourceKey {
  pub fn new<I, S>(kind: ResourceKind, params: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      kind,
      params: params.into_iter().map(Into::into).collect(),
    }
  }

  /// Key with no parameters (e.g. the viewer's profile).
  pub fn bare(kind: ResourceKind) -> Self {
    Self {
      kind,
      params: Vec::new(),
    }
  }

  /// True if this key falls under the given prefix.
  pub fn matches(&self, prefix: &KeyPrefix) -> bool {
    self.kind == prefix.kind && self.params.starts_with(&prefix.params)
  }
}

impl fmt::Display for ResourceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.kind)?;
    for p in &self.params {
      write!(f, ":{}", p)?;
    }
    Ok(())
  }
}

/// Leading portion of a key, used for invalidation matching.
///
/// A prefix with no params matches every key of its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix {
  pub kind: ResourceKind,
  pub params: Vec<String>,
}

impl KeyPrefix {
  pub fn new<I, S>(kind: ResourceKind, params: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      kind,
      params: params.into_iter().map(Into::into).collect(),
    }
  }

  pub fn bare(kind: ResourceKind) -> Self {
    Self {
      kind,
      params: Vec::new(),
    }
  }
}

impl fmt::Display for KeyPrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.kind)?;
    for p in &self.params {
      write!(f, ":{}", p)?;
    }
    write!(f, ":*")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_key_equality_is_deep() {
    let a = ResourceKey::new(ResourceKind::RepoCommits, ["acme", "widgets", "1", "20", "main"]);
    let b = ResourceKey::new(ResourceKind::RepoCommits, ["acme", "widgets", "1", "20", "main"]);
    let c = ResourceKey::new(ResourceKind::RepoCommits, ["acme", "widgets", "2", "20", "main"]);

    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn test_prefix_matches_any_suffix() {
    let prefix = KeyPrefix::new(ResourceKind::RepoCommits, ["acme", "widgets"]);

    let page1 = ResourceKey::new(ResourceKind::RepoCommits, ["acme", "widgets", "1", "20", "main"]);
    let page2 = ResourceKey::new(ResourceKind::RepoCommits, ["acme", "widgets", "2", "20", "dev"]);
    let other_repo = ResourceKey::new(ResourceKind::RepoCommits, ["acme", "gadgets", "1", "20", "main"]);
    let other_kind = ResourceKey::new(ResourceKind::RepoIssues, ["acme", "widgets", "1"]);

    assert!(page1.matches(&prefix));
    assert!(page2.matches(&prefix));
    assert!(!other_repo.matches(&prefix));
    assert!(!other_kind.matches(&prefix));
  }

  #[test]
  fn test_bare_prefix_matches_whole_kind() {
    let prefix = KeyPrefix::bare(ResourceKind::Repos);
    let key = ResourceKey::new(ResourceKind::Repos, ["1", "20", "updated"]);

    assert!(key.matches(&prefix));
  }

  #[test]
  fn test_display_is_colon_separated() {
    let key = ResourceKey::new(ResourceKind::IssueDetail, ["acme", "widgets", "42"]);
    assert_eq!(key.to_string(), "issue_detail:acme:widgets:42");

    let prefix = KeyPrefix::new(ResourceKind::RepoIssues, ["acme", "widgets"]);
    assert_eq!(prefix.to_string(), "repo_issues:acme:widgets:*");
  }
}
