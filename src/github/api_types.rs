//! Serde-deserializable types matching raw gateway payloads.
//!
//! These are separate from the domain types in `types.rs` so schema drift
//! from the upstream API is absorbed here and nowhere else: every field
//! that the server has ever omitted or nulled is `Option` or `default`,
//! and the adapters in `normalize.rs` map them onto total domain shapes.

use serde::Deserialize;

use crate::cache::pagination::PageMeta;

/// Envelope every gateway endpoint wraps its response in.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub data: Option<T>,
  pub message: Option<String>,
}

/// Pagination metadata list endpoints nest under `data`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawPageMeta {
  #[serde(default)]
  pub page: u32,
  #[serde(rename = "perPage", default)]
  pub per_page: u32,
  #[serde(rename = "hasMore", default)]
  pub has_more: bool,
}

impl From<RawPageMeta> for PageMeta {
  fn from(raw: RawPageMeta) -> Self {
    PageMeta {
      page: raw.page.max(1),
      per_page: raw.per_page,
      has_more: raw.has_more,
    }
  }
}

// ============================================================================
// Users and owners
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawOwner {
  pub login: Option<String>,
  #[serde(rename = "avatarUrl")]
  pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawUserProfile {
  pub login: Option<String>,
  pub name: Option<String>,
  pub bio: Option<String>,
  pub company: Option<String>,
  pub location: Option<String>,
  #[serde(rename = "publicRepos")]
  pub public_repos: Option<u32>,
  pub followers: Option<u32>,
  pub following: Option<u32>,
  #[serde(rename = "avatarUrl")]
  pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawOrg {
  pub login: Option<String>,
  pub description: Option<String>,
  #[serde(rename = "avatarUrl")]
  pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawOrgList {
  #[serde(default)]
  pub organizations: Vec<RawOrg>,
}

// ============================================================================
// Repositories
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawRepository {
  pub id: Option<u64>,
  pub name: Option<String>,
  #[serde(rename = "fullName")]
  pub full_name: Option<String>,
  pub owner: Option<RawOwner>,
  pub description: Option<String>,
  pub private: Option<bool>,
  pub fork: Option<bool>,
  pub archived: Option<bool>,
  #[serde(rename = "stargazersCount")]
  pub stargazers_count: Option<u32>,
  #[serde(rename = "forksCount")]
  pub forks_count: Option<u32>,
  #[serde(rename = "openIssuesCount")]
  pub open_issues_count: Option<u32>,
  #[serde(rename = "watchersCount")]
  pub watchers_count: Option<u32>,
  #[serde(rename = "defaultBranch")]
  pub default_branch: Option<String>,
  pub language: Option<String>,
  #[serde(default)]
  pub topics: Vec<String>,
  #[serde(rename = "updatedAt")]
  pub updated_at: Option<String>,
  #[serde(rename = "htmlUrl")]
  pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawRepoList {
  #[serde(default)]
  pub repositories: Vec<RawRepository>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

// ============================================================================
// Commits
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawCommitAuthor {
  pub name: Option<String>,
  pub login: Option<String>,
  pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCommit {
  pub sha: Option<String>,
  pub message: Option<String>,
  pub author: Option<RawCommitAuthor>,
  #[serde(rename = "htmlUrl")]
  pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCommitList {
  #[serde(default)]
  pub commits: Vec<RawCommit>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawCommitFile {
  pub filename: Option<String>,
  pub status: Option<String>,
  pub additions: Option<u32>,
  pub deletions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RawCommitDetail {
  #[serde(flatten)]
  pub commit: RawCommit,
  pub additions: Option<u32>,
  pub deletions: Option<u32>,
  #[serde(default)]
  pub files: Vec<RawCommitFile>,
}

// ============================================================================
// Branches and tags
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawBranch {
  pub name: Option<String>,
  pub sha: Option<String>,
  pub protected: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RawBranchList {
  #[serde(default)]
  pub branches: Vec<RawBranch>,
}

#[derive(Debug, Deserialize)]
pub struct RawTag {
  pub name: Option<String>,
  pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTagList {
  #[serde(default)]
  pub tags: Vec<RawTag>,
}

// ============================================================================
// Issues and comments
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawLabel {
  pub name: Option<String>,
  pub color: Option<String>,
  pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawLabelList {
  #[serde(default)]
  pub labels: Vec<RawLabel>,
}

#[derive(Debug, Deserialize)]
pub struct RawIssue {
  pub number: Option<u64>,
  pub title: Option<String>,
  pub state: Option<String>,
  pub body: Option<String>,
  pub user: Option<RawOwner>,
  #[serde(default)]
  pub labels: Vec<RawLabel>,
  #[serde(default)]
  pub assignees: Vec<RawOwner>,
  pub milestone: Option<RawMilestone>,
  pub comments: Option<u32>,
  #[serde(rename = "createdAt")]
  pub created_at: Option<String>,
  #[serde(rename = "updatedAt")]
  pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawIssueList {
  #[serde(default)]
  pub issues: Vec<RawIssue>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawComment {
  pub id: Option<u64>,
  pub body: Option<String>,
  pub user: Option<RawOwner>,
  #[serde(rename = "createdAt")]
  pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCommentList {
  #[serde(default)]
  pub comments: Vec<RawComment>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawMilestone {
  pub number: Option<u64>,
  pub title: Option<String>,
  pub state: Option<String>,
  #[serde(rename = "openIssues")]
  pub open_issues: Option<u32>,
  #[serde(rename = "closedIssues")]
  pub closed_issues: Option<u32>,
  #[serde(rename = "dueOn")]
  pub due_on: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawMilestoneList {
  #[serde(default)]
  pub milestones: Vec<RawMilestone>,
}

// ============================================================================
// Pull requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawPull {
  pub number: Option<u64>,
  pub title: Option<String>,
  pub state: Option<String>,
  pub body: Option<String>,
  pub draft: Option<bool>,
  pub merged: Option<bool>,
  pub mergeable: Option<bool>,
  pub user: Option<RawOwner>,
  #[serde(rename = "headRef")]
  pub head_ref: Option<String>,
  #[serde(rename = "baseRef")]
  pub base_ref: Option<String>,
  #[serde(rename = "changedFiles")]
  pub changed_files: Option<u32>,
  pub additions: Option<u32>,
  pub deletions: Option<u32>,
  #[serde(rename = "createdAt")]
  pub created_at: Option<String>,
  #[serde(rename = "updatedAt")]
  pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPullList {
  #[serde(rename = "pullRequests", default)]
  pub pull_requests: Vec<RawPull>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawPullFile {
  pub filename: Option<String>,
  pub status: Option<String>,
  pub additions: Option<u32>,
  pub deletions: Option<u32>,
  pub changes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RawPullFileList {
  #[serde(default)]
  pub files: Vec<RawPullFile>,
}

// ============================================================================
// Releases
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawReleaseAsset {
  pub id: Option<u64>,
  pub name: Option<String>,
  pub size: Option<u64>,
  #[serde(rename = "downloadCount")]
  pub download_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawRelease {
  pub id: Option<u64>,
  #[serde(rename = "tagName")]
  pub tag_name: Option<String>,
  pub name: Option<String>,
  pub body: Option<String>,
  pub draft: Option<bool>,
  pub prerelease: Option<bool>,
  #[serde(rename = "publishedAt")]
  pub published_at: Option<String>,
  #[serde(default)]
  pub assets: Vec<RawReleaseAsset>,
}

#[derive(Debug, Deserialize)]
pub struct RawReleaseList {
  #[serde(default)]
  pub releases: Vec<RawRelease>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

// ============================================================================
// Collaborators, contributors, languages, readme
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawCollaborator {
  pub login: Option<String>,
  #[serde(rename = "avatarUrl")]
  pub avatar_url: Option<String>,
  #[serde(rename = "roleName")]
  pub role_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCollaboratorList {
  #[serde(default)]
  pub collaborators: Vec<RawCollaborator>,
}

#[derive(Debug, Deserialize)]
pub struct RawContributor {
  pub login: Option<String>,
  pub contributions: Option<u32>,
  #[serde(rename = "avatarUrl")]
  pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawContributorList {
  #[serde(default)]
  pub contributors: Vec<RawContributor>,
}

#[derive(Debug, Deserialize)]
pub struct RawReadme {
  pub name: Option<String>,
  pub content: Option<String>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawNotificationSubject {
  pub title: Option<String>,
  #[serde(rename = "type")]
  pub subject_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawNotification {
  pub id: Option<String>,
  pub reason: Option<String>,
  pub unread: Option<bool>,
  pub subject: Option<RawNotificationSubject>,
  #[serde(rename = "repositoryFullName")]
  pub repository_full_name: Option<String>,
  #[serde(rename = "updatedAt")]
  pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawNotificationList {
  #[serde(default)]
  pub notifications: Vec<RawNotification>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RawRepoSearch {
  #[serde(default)]
  pub items: Vec<RawRepository>,
  #[serde(rename = "totalCount")]
  pub total_count: Option<u64>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawIssueSearch {
  #[serde(default)]
  pub items: Vec<RawIssue>,
  #[serde(rename = "totalCount")]
  pub total_count: Option<u64>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawUserSearch {
  #[serde(default)]
  pub items: Vec<RawOwner>,
  #[serde(rename = "totalCount")]
  pub total_count: Option<u64>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}

#[derive(Debug, Deserialize)]
pub struct RawCodeHit {
  pub path: Option<String>,
  pub repository: Option<String>,
  #[serde(rename = "htmlUrl")]
  pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCodeSearch {
  #[serde(default)]
  pub items: Vec<RawCodeHit>,
  #[serde(rename = "totalCount")]
  pub total_count: Option<u64>,
  #[serde(flatten)]
  pub meta: RawPageMeta,
}
