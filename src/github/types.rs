//! Normalized domain types.
//!
//! Every field here is total: the adapters in `normalize.rs` guarantee a
//! defined value for each required position, so nothing downstream ever
//! inspects raw payload shapes or handles surprise nulls. `Option` appears
//! only where absence is a meaningful domain state (e.g. an issue without
//! a milestone), never as leftover upstream looseness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A page of a list resource, with pagination state as the server reported
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page: u32,
  pub per_page: u32,
  pub has_more: bool,
}

/// A page of search results; searches also carry a server total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage<T> {
  pub items: Vec<T>,
  pub total_count: u64,
  pub page: u32,
  pub per_page: u32,
  pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub login: String,
  pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
  pub id: u64,
  pub name: String,
  pub full_name: String,
  pub owner_login: String,
  pub description: String,
  pub private: bool,
  pub fork: bool,
  pub archived: bool,
  pub stargazers: u32,
  pub forks: u32,
  pub open_issues: u32,
  pub watchers: u32,
  pub default_branch: String,
  pub language: Option<String>,
  pub topics: Vec<String>,
  pub updated_at: String,
  pub html_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
  pub sha: String,
  pub message: String,
  pub author_login: String,
  pub author_name: String,
  pub authored_at: String,
  pub html_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitFile {
  pub filename: String,
  pub status: String,
  pub additions: u32,
  pub deletions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
  pub commit: Commit,
  pub additions: u32,
  pub deletions: u32,
  pub files: Vec<CommitFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
  pub name: String,
  pub sha: String,
  pub protected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub name: String,
  pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
  pub name: String,
  pub color: String,
  pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
  pub number: u64,
  pub title: String,
  pub state: String,
  pub open_issues: u32,
  pub closed_issues: u32,
  pub due_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  pub state: String,
  pub body: String,
  pub author_login: String,
  pub labels: Vec<Label>,
  pub assignees: Vec<String>,
  pub milestone: Option<String>,
  pub comments: u32,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id: u64,
  pub body: String,
  pub author_login: String,
  pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub state: String,
  pub body: String,
  pub draft: bool,
  pub merged: bool,
  pub mergeable: Option<bool>,
  pub author_login: String,
  pub head_ref: String,
  pub base_ref: String,
  pub changed_files: u32,
  pub additions: u32,
  pub deletions: u32,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullFile {
  pub filename: String,
  pub status: String,
  pub additions: u32,
  pub deletions: u32,
  pub changes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
  pub id: u64,
  pub name: String,
  pub size: u64,
  pub download_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
  pub id: u64,
  pub tag_name: String,
  pub name: String,
  pub body: String,
  pub draft: bool,
  pub prerelease: bool,
  pub published_at: String,
  pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
  pub login: String,
  pub avatar_url: String,
  pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
  pub login: String,
  pub contributions: u32,
  pub avatar_url: String,
}

/// Bytes of code per language, as the gateway reports them.
pub type Languages = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readme {
  pub name: String,
  pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub id: String,
  pub reason: String,
  pub unread: bool,
  pub subject_title: String,
  pub subject_type: String,
  pub repository_full_name: String,
  pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub login: String,
  pub name: String,
  pub bio: String,
  pub company: String,
  pub location: String,
  pub public_repos: u32,
  pub followers: u32,
  pub following: u32,
  pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
  pub login: String,
  pub description: String,
  pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeHit {
  pub path: String,
  pub repository: String,
  pub html_url: String,
}
