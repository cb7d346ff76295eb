//! Normalization adapters: raw gateway payloads to total domain shapes.
//!
//! Each adapter is a pure function with an explicit mapping for every
//! field. Absent upstream fields resolve to defined defaults: a missing
//! owner login is derived from the `owner/name` composite, missing counts
//! become 0, missing booleans become false. No `Option` leaks into a field
//! the domain type declares required.

use super::api_types::*;
use super::types::*;
use crate::cache::pagination::PageMeta;

fn page_of<T>(items: Vec<T>, meta: RawPageMeta) -> Page<T> {
  let meta: PageMeta = meta.into();
  Page {
    items,
    page: meta.page,
    per_page: meta.per_page,
    has_more: meta.has_more,
  }
}

fn search_page_of<T>(items: Vec<T>, total_count: Option<u64>, meta: RawPageMeta) -> SearchPage<T> {
  let meta: PageMeta = meta.into();
  SearchPage {
    items,
    total_count: total_count.unwrap_or(0),
    page: meta.page,
    per_page: meta.per_page,
    has_more: meta.has_more,
  }
}

pub fn owner(raw: RawOwner) -> Owner {
  Owner {
    login: raw.login.unwrap_or_default(),
    avatar_url: raw.avatar_url.unwrap_or_default(),
  }
}

pub fn repository(raw: RawRepository) -> Repository {
  let name = raw.name.unwrap_or_default();
  let owner_login = raw
    .owner
    .as_ref()
    .and_then(|o| o.login.clone())
    .or_else(|| {
      // Some payloads drop the owner object; recover the login from the
      // "owner/name" composite.
      raw
        .full_name
        .as_deref()
        .and_then(|f| f.split('/').next())
        .map(String::from)
    })
    .unwrap_or_default();
  let full_name = raw.full_name.unwrap_or_else(|| {
    if owner_login.is_empty() {
      name.clone()
    } else {
      format!("{}/{}", owner_login, name)
    }
  });

  Repository {
    id: raw.id.unwrap_or(0),
    name,
    full_name,
    owner_login,
    description: raw.description.unwrap_or_default(),
    private: raw.private.unwrap_or(false),
    fork: raw.fork.unwrap_or(false),
    archived: raw.archived.unwrap_or(false),
    stargazers: raw.stargazers_count.unwrap_or(0),
    forks: raw.forks_count.unwrap_or(0),
    open_issues: raw.open_issues_count.unwrap_or(0),
    watchers: raw.watchers_count.unwrap_or(0),
    default_branch: raw.default_branch.unwrap_or_else(|| "main".to_string()),
    language: raw.language,
    topics: raw.topics,
    updated_at: raw.updated_at.unwrap_or_default(),
    html_url: raw.html_url.unwrap_or_default(),
  }
}

pub fn repo_page(raw: RawRepoList) -> Page<Repository> {
  page_of(raw.repositories.into_iter().map(repository).collect(), raw.meta)
}

pub fn commit(raw: RawCommit) -> Commit {
  let author_login = raw
    .author
    .as_ref()
    .and_then(|a| a.login.clone())
    .unwrap_or_default();
  let author_name = raw
    .author
    .as_ref()
    .and_then(|a| a.name.clone())
    .unwrap_or_else(|| author_login.clone());

  Commit {
    sha: raw.sha.unwrap_or_default(),
    message: raw.message.unwrap_or_default(),
    authored_at: raw.author.and_then(|a| a.date).unwrap_or_default(),
    author_login,
    author_name,
    html_url: raw.html_url.unwrap_or_default(),
  }
}

pub fn commit_page(raw: RawCommitList) -> Page<Commit> {
  page_of(raw.commits.into_iter().map(commit).collect(), raw.meta)
}

pub fn commit_file(raw: RawCommitFile) -> CommitFile {
  CommitFile {
    filename: raw.filename.unwrap_or_default(),
    status: raw.status.unwrap_or_default(),
    additions: raw.additions.unwrap_or(0),
    deletions: raw.deletions.unwrap_or(0),
  }
}

pub fn commit_detail(raw: RawCommitDetail) -> CommitDetail {
  let files: Vec<CommitFile> = raw.files.into_iter().map(commit_file).collect();
  // Derive stats from the file list when the server omits totals.
  let additions = raw
    .additions
    .unwrap_or_else(|| files.iter().map(|f| f.additions).sum());
  let deletions = raw
    .deletions
    .unwrap_or_else(|| files.iter().map(|f| f.deletions).sum());

  CommitDetail {
    commit: commit(raw.commit),
    additions,
    deletions,
    files,
  }
}

pub fn branch(raw: RawBranch) -> Branch {
  Branch {
    name: raw.name.unwrap_or_default(),
    sha: raw.sha.unwrap_or_default(),
    protected: raw.protected.unwrap_or(false),
  }
}

pub fn branch_list(raw: RawBranchList) -> Vec<Branch> {
  raw.branches.into_iter().map(branch).collect()
}

pub fn tag_list(raw: RawTagList) -> Vec<Tag> {
  raw
    .tags
    .into_iter()
    .map(|t| Tag {
      name: t.name.unwrap_or_default(),
      sha: t.sha.unwrap_or_default(),
    })
    .collect()
}

pub fn label(raw: RawLabel) -> Label {
  Label {
    name: raw.name.unwrap_or_default(),
    color: raw.color.unwrap_or_default(),
    description: raw.description.unwrap_or_default(),
  }
}

pub fn label_list(raw: RawLabelList) -> Vec<Label> {
  raw.labels.into_iter().map(label).collect()
}

pub fn milestone(raw: RawMilestone) -> Milestone {
  Milestone {
    number: raw.number.unwrap_or(0),
    title: raw.title.unwrap_or_default(),
    state: raw.state.unwrap_or_else(|| "open".to_string()),
    open_issues: raw.open_issues.unwrap_or(0),
    closed_issues: raw.closed_issues.unwrap_or(0),
    due_on: raw.due_on,
  }
}

pub fn milestone_list(raw: RawMilestoneList) -> Vec<Milestone> {
  raw.milestones.into_iter().map(milestone).collect()
}

pub fn issue(raw: RawIssue) -> Issue {
  Issue {
    number: raw.number.unwrap_or(0),
    title: raw.title.unwrap_or_default(),
    state: raw.state.unwrap_or_else(|| "open".to_string()),
    body: raw.body.unwrap_or_default(),
    author_login: raw.user.and_then(|u| u.login).unwrap_or_default(),
    labels: raw.labels.into_iter().map(label).collect(),
    assignees: raw
      .assignees
      .into_iter()
      .filter_map(|a| a.login)
      .collect(),
    milestone: raw.milestone.and_then(|m| m.title),
    comments: raw.comments.unwrap_or(0),
    created_at: raw.created_at.unwrap_or_default(),
    updated_at: raw.updated_at.unwrap_or_default(),
  }
}

pub fn issue_page(raw: RawIssueList) -> Page<Issue> {
  page_of(raw.issues.into_iter().map(issue).collect(), raw.meta)
}

pub fn comment(raw: RawComment) -> Comment {
  Comment {
    id: raw.id.unwrap_or(0),
    body: raw.body.unwrap_or_default(),
    author_login: raw.user.and_then(|u| u.login).unwrap_or_default(),
    created_at: raw.created_at.unwrap_or_default(),
  }
}

pub fn comment_page(raw: RawCommentList) -> Page<Comment> {
  page_of(raw.comments.into_iter().map(comment).collect(), raw.meta)
}

pub fn pull(raw: RawPull) -> PullRequest {
  PullRequest {
    number: raw.number.unwrap_or(0),
    title: raw.title.unwrap_or_default(),
    state: raw.state.unwrap_or_else(|| "open".to_string()),
    body: raw.body.unwrap_or_default(),
    draft: raw.draft.unwrap_or(false),
    merged: raw.merged.unwrap_or(false),
    // Mergeability is genuinely tri-state upstream (unknown while GitHub
    // computes it), so Option survives normalization.
    mergeable: raw.mergeable,
    author_login: raw.user.and_then(|u| u.login).unwrap_or_default(),
    head_ref: raw.head_ref.unwrap_or_default(),
    base_ref: raw.base_ref.unwrap_or_default(),
    changed_files: raw.changed_files.unwrap_or(0),
    additions: raw.additions.unwrap_or(0),
    deletions: raw.deletions.unwrap_or(0),
    created_at: raw.created_at.unwrap_or_default(),
    updated_at: raw.updated_at.unwrap_or_default(),
  }
}

pub fn pull_page(raw: RawPullList) -> Page<PullRequest> {
  page_of(raw.pull_requests.into_iter().map(pull).collect(), raw.meta)
}

pub fn pull_file_list(raw: RawPullFileList) -> Vec<PullFile> {
  raw
    .files
    .into_iter()
    .map(|f| {
      let additions = f.additions.unwrap_or(0);
      let deletions = f.deletions.unwrap_or(0);
      PullFile {
        filename: f.filename.unwrap_or_default(),
        status: f.status.unwrap_or_default(),
        additions,
        deletions,
        changes: f.changes.unwrap_or(additions + deletions),
      }
    })
    .collect()
}

pub fn release(raw: RawRelease) -> Release {
  Release {
    id: raw.id.unwrap_or(0),
    tag_name: raw.tag_name.unwrap_or_default(),
    name: raw.name.unwrap_or_default(),
    body: raw.body.unwrap_or_default(),
    draft: raw.draft.unwrap_or(false),
    prerelease: raw.prerelease.unwrap_or(false),
    published_at: raw.published_at.unwrap_or_default(),
    assets: raw
      .assets
      .into_iter()
      .map(|a| ReleaseAsset {
        id: a.id.unwrap_or(0),
        name: a.name.unwrap_or_default(),
        size: a.size.unwrap_or(0),
        download_count: a.download_count.unwrap_or(0),
      })
      .collect(),
  }
}

pub fn release_page(raw: RawReleaseList) -> Page<Release> {
  page_of(raw.releases.into_iter().map(release).collect(), raw.meta)
}

pub fn collaborator_list(raw: RawCollaboratorList) -> Vec<Collaborator> {
  raw
    .collaborators
    .into_iter()
    .map(|c| Collaborator {
      login: c.login.unwrap_or_default(),
      avatar_url: c.avatar_url.unwrap_or_default(),
      role: c.role_name.unwrap_or_else(|| "read".to_string()),
    })
    .collect()
}

pub fn contributor_list(raw: RawContributorList) -> Vec<Contributor> {
  raw
    .contributors
    .into_iter()
    .map(|c| Contributor {
      login: c.login.unwrap_or_default(),
      contributions: c.contributions.unwrap_or(0),
      avatar_url: c.avatar_url.unwrap_or_default(),
    })
    .collect()
}

pub fn readme(raw: RawReadme) -> Readme {
  Readme {
    name: raw.name.unwrap_or_else(|| "README.md".to_string()),
    content: raw.content.unwrap_or_default(),
  }
}

pub fn notification(raw: RawNotification) -> Notification {
  let subject = raw.subject;
  Notification {
    id: raw.id.unwrap_or_default(),
    reason: raw.reason.unwrap_or_default(),
    unread: raw.unread.unwrap_or(false),
    subject_title: subject
      .as_ref()
      .and_then(|s| s.title.clone())
      .unwrap_or_default(),
    subject_type: subject.and_then(|s| s.subject_type).unwrap_or_default(),
    repository_full_name: raw.repository_full_name.unwrap_or_default(),
    updated_at: raw.updated_at.unwrap_or_default(),
  }
}

pub fn notification_page(raw: RawNotificationList) -> Page<Notification> {
  page_of(
    raw.notifications.into_iter().map(notification).collect(),
    raw.meta,
  )
}

pub fn user_profile(raw: RawUserProfile) -> UserProfile {
  let login = raw.login.unwrap_or_default();
  UserProfile {
    name: raw.name.unwrap_or_else(|| login.clone()),
    login,
    bio: raw.bio.unwrap_or_default(),
    company: raw.company.unwrap_or_default(),
    location: raw.location.unwrap_or_default(),
    public_repos: raw.public_repos.unwrap_or(0),
    followers: raw.followers.unwrap_or(0),
    following: raw.following.unwrap_or(0),
    avatar_url: raw.avatar_url.unwrap_or_default(),
  }
}

pub fn org_list(raw: RawOrgList) -> Vec<Org> {
  raw
    .organizations
    .into_iter()
    .map(|o| Org {
      login: o.login.unwrap_or_default(),
      description: o.description.unwrap_or_default(),
      avatar_url: o.avatar_url.unwrap_or_default(),
    })
    .collect()
}

pub fn repo_search_page(raw: RawRepoSearch) -> SearchPage<Repository> {
  search_page_of(
    raw.items.into_iter().map(repository).collect(),
    raw.total_count,
    raw.meta,
  )
}

pub fn issue_search_page(raw: RawIssueSearch) -> SearchPage<Issue> {
  search_page_of(
    raw.items.into_iter().map(issue).collect(),
    raw.total_count,
    raw.meta,
  )
}

pub fn user_search_page(raw: RawUserSearch) -> SearchPage<Owner> {
  search_page_of(
    raw.items.into_iter().map(owner).collect(),
    raw.total_count,
    raw.meta,
  )
}

pub fn code_search_page(raw: RawCodeSearch) -> SearchPage<CodeHit> {
  search_page_of(
    raw
      .items
      .into_iter()
      .map(|h| CodeHit {
        path: h.path.unwrap_or_default(),
        repository: h.repository.unwrap_or_default(),
        html_url: h.html_url.unwrap_or_default(),
      })
      .collect(),
    raw.total_count,
    raw.meta,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_repository_owner_login_derived_from_full_name() {
    let raw: RawRepository = serde_json::from_value(json!({
      "name": "widgets",
      "fullName": "acme/widgets"
    }))
    .unwrap();

    let repo = repository(raw);
    assert_eq!(repo.owner_login, "acme");
    assert_eq!(repo.full_name, "acme/widgets");
  }

  #[test]
  fn test_repository_full_name_rebuilt_from_owner() {
    let raw: RawRepository = serde_json::from_value(json!({
      "name": "widgets",
      "owner": {"login": "acme"}
    }))
    .unwrap();

    let repo = repository(raw);
    assert_eq!(repo.full_name, "acme/widgets");
  }

  #[test]
  fn test_repository_totality_on_empty_payload() {
    let raw: RawRepository = serde_json::from_value(json!({})).unwrap();
    let repo = repository(raw);

    assert_eq!(repo.id, 0);
    assert_eq!(repo.stargazers, 0);
    assert_eq!(repo.open_issues, 0);
    assert!(!repo.private);
    assert!(!repo.fork);
    assert_eq!(repo.default_branch, "main");
    assert!(repo.topics.is_empty());
  }

  #[test]
  fn test_issue_totality_on_sparse_payload() {
    let raw: RawIssue = serde_json::from_value(json!({"number": 7})).unwrap();
    let issue = issue(raw);

    assert_eq!(issue.number, 7);
    assert_eq!(issue.state, "open");
    assert_eq!(issue.body, "");
    assert_eq!(issue.comments, 0);
    assert!(issue.labels.is_empty());
    assert!(issue.milestone.is_none());
  }

  #[test]
  fn test_commit_author_name_falls_back_to_login() {
    let raw: RawCommit = serde_json::from_value(json!({
      "sha": "abc123",
      "author": {"login": "mona"}
    }))
    .unwrap();

    let c = commit(raw);
    assert_eq!(c.author_login, "mona");
    assert_eq!(c.author_name, "mona");
  }

  #[test]
  fn test_commit_detail_stats_derived_from_files() {
    let raw: RawCommitDetail = serde_json::from_value(json!({
      "sha": "abc123",
      "files": [
        {"filename": "a.rs", "additions": 3, "deletions": 1},
        {"filename": "b.rs", "additions": 2, "deletions": 4}
      ]
    }))
    .unwrap();

    let detail = commit_detail(raw);
    assert_eq!(detail.additions, 5);
    assert_eq!(detail.deletions, 5);
  }

  #[test]
  fn test_pull_mergeable_stays_tristate() {
    let raw: RawPull = serde_json::from_value(json!({"number": 1})).unwrap();
    assert_eq!(pull(raw).mergeable, None);
  }

  #[test]
  fn test_page_meta_comes_from_server_fields_only() {
    // 20 items with perPage 20 but hasMore false: the exact-multiple case
    // the length heuristic gets wrong.
    let items: Vec<serde_json::Value> =
      (0..20).map(|i| json!({"name": format!("r{}", i)})).collect();
    let raw: RawRepoList = serde_json::from_value(json!({
      "repositories": items,
      "page": 1,
      "perPage": 20,
      "hasMore": false
    }))
    .unwrap();

    let page = repo_page(raw);
    assert_eq!(page.items.len(), 20);
    assert!(!page.has_more);
  }

  #[test]
  fn test_search_page_carries_total() {
    let raw: RawRepoSearch = serde_json::from_value(json!({
      "items": [{"fullName": "acme/widgets"}],
      "totalCount": 812,
      "page": 1,
      "perPage": 20,
      "hasMore": true
    }))
    .unwrap();

    let page = repo_search_page(raw);
    assert_eq!(page.total_count, 812);
    assert!(page.has_more);
  }

  #[test]
  fn test_notification_defaults() {
    let raw: RawNotification = serde_json::from_value(json!({"id": "n1"})).unwrap();
    let n = notification(raw);

    assert_eq!(n.id, "n1");
    assert!(!n.unread);
    assert_eq!(n.subject_title, "");
    assert_eq!(n.repository_full_name, "");
  }
}
