//! Write contract: relays mutations to the gateway and reconciles cache
//! state afterwards.
//!
//! On success the response is normalized and, where it is the full updated
//! resource, merged straight into the matching detail entry so the UI
//! updates without waiting for a round trip; the declared invalidation
//! prefixes are then staled so the next read refetches authoritative data.
//! On failure nothing in the cache changes and the classified error goes
//! back to the caller. Mutations are never retried automatically;
//! silently replaying a non-idempotent write could double-apply it.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::cache::invalidate::{invalidation_targets, MutationKind};
use crate::cache::key::{ResourceKey, ResourceKind};
use crate::cache::store::{CacheStore, FetchStatus};
use crate::error::{ApiError, Result};
use crate::notify::Notifier;

use super::api_types::{RawIssue, RawPull, RawRelease, RawRepository};
use super::client::GatewayClient;
use super::normalize;

/// One write operation: what to do plus the JSON body to send.
#[derive(Debug, Clone)]
pub struct Mutation {
  pub kind: MutationKind,
  pub payload: Value,
}

impl Mutation {
  pub fn new(kind: MutationKind, payload: Value) -> Self {
    Self { kind, payload }
  }

  /// For mutations whose route needs no body (deletes, mark-read).
  pub fn without_payload(kind: MutationKind) -> Self {
    Self {
      kind,
      payload: Value::Null,
    }
  }
}

/// Gateway route for each mutation kind.
fn route(kind: &MutationKind) -> (Method, String) {
  use MutationKind::*;
  match kind {
    CreateRepo => (Method::POST, "/repos".to_string()),
    UpdateRepo { owner, repo } => (Method::PATCH, format!("/repos/{}/{}", owner, repo)),
    DeleteRepo { owner, repo } => (Method::DELETE, format!("/repos/{}/{}", owner, repo)),
    UpdateRepoTopics { owner, repo } => (Method::PUT, format!("/repos/{}/{}/topics", owner, repo)),
    CreateIssue { owner, repo } => (Method::POST, format!("/repos/{}/{}/issues", owner, repo)),
    UpdateIssue { owner, repo, number } | CloseIssue { owner, repo, number } => {
      (Method::PATCH, format!("/repos/{}/{}/issues/{}", owner, repo, number))
    }
    CreateIssueComment { owner, repo, number } => (
      Method::POST,
      format!("/repos/{}/{}/issues/{}/comments", owner, repo, number),
    ),
    CreatePull { owner, repo } => (Method::POST, format!("/repos/{}/{}/pulls", owner, repo)),
    UpdatePull { owner, repo, number } => {
      (Method::PATCH, format!("/repos/{}/{}/pulls/{}", owner, repo, number))
    }
    MergePull { owner, repo, number } => (
      Method::PUT,
      format!("/repos/{}/{}/pulls/{}/merge", owner, repo, number),
    ),
    CreateBranch { owner, repo } => (Method::POST, format!("/repos/{}/{}/branches", owner, repo)),
    DeleteBranch { owner, repo, branch } => (
      Method::DELETE,
      format!("/repos/{}/{}/branches/{}", owner, repo, branch),
    ),
    CreateRelease { owner, repo } => (Method::POST, format!("/repos/{}/{}/releases", owner, repo)),
    UpdateRelease { owner, repo, release_id } => (
      Method::PATCH,
      format!("/repos/{}/{}/releases/{}", owner, repo, release_id),
    ),
    DeleteRelease { owner, repo, release_id } => (
      Method::DELETE,
      format!("/repos/{}/{}/releases/{}", owner, repo, release_id),
    ),
    AddCollaborator { owner, repo, username } => (
      Method::PUT,
      format!("/repos/{}/{}/collaborators/{}", owner, repo, username),
    ),
    RemoveCollaborator { owner, repo, username } => (
      Method::DELETE,
      format!("/repos/{}/{}/collaborators/{}", owner, repo, username),
    ),
    CreateLabel { owner, repo } => (Method::POST, format!("/repos/{}/{}/labels", owner, repo)),
    UpdateLabel { owner, repo, name } => {
      (Method::PATCH, format!("/repos/{}/{}/labels/{}", owner, repo, name))
    }
    DeleteLabel { owner, repo, name } => {
      (Method::DELETE, format!("/repos/{}/{}/labels/{}", owner, repo, name))
    }
    CreateMilestone { owner, repo } => {
      (Method::POST, format!("/repos/{}/{}/milestones", owner, repo))
    }
    MarkNotificationRead { thread_id } => {
      (Method::PATCH, format!("/notifications/threads/{}", thread_id))
    }
    MarkAllNotificationsRead => (Method::PUT, "/notifications/read".to_string()),
  }
}

fn success_message(kind: &MutationKind) -> &'static str {
  use MutationKind::*;
  match kind {
    CreateRepo => "Repository created",
    UpdateRepo { .. } => "Repository updated",
    DeleteRepo { .. } => "Repository deleted",
    UpdateRepoTopics { .. } => "Topics updated",
    CreateIssue { .. } => "Issue created",
    UpdateIssue { .. } => "Issue updated",
    CloseIssue { .. } => "Issue closed",
    CreateIssueComment { .. } => "Comment added",
    CreatePull { .. } => "Pull request created",
    UpdatePull { .. } => "Pull request updated",
    MergePull { .. } => "Pull request merged",
    CreateBranch { .. } => "Branch created",
    DeleteBranch { .. } => "Branch deleted",
    CreateRelease { .. } => "Release created",
    UpdateRelease { .. } => "Release updated",
    DeleteRelease { .. } => "Release deleted",
    AddCollaborator { .. } => "Collaborator added",
    RemoveCollaborator { .. } => "Collaborator removed",
    CreateLabel { .. } => "Label created",
    UpdateLabel { .. } => "Label updated",
    DeleteLabel { .. } => "Label deleted",
    CreateMilestone { .. } => "Milestone created",
    MarkNotificationRead { .. } => "Notification marked as read",
    MarkAllNotificationsRead => "All notifications marked as read",
  }
}

/// Where a mutation's response can be merged as an optimistic local
/// update: only mutations that return the full updated resource qualify.
fn optimistic_target(kind: &MutationKind, response: &Value) -> Option<(ResourceKey, Value)> {
  use MutationKind::*;
  use ResourceKind as R;

  let (key, normalized) = match kind {
    UpdateRepo { owner, repo } | UpdateRepoTopics { owner, repo } => {
      let raw: RawRepository = serde_json::from_value(response.clone()).ok()?;
      (
        ResourceKey::new(R::RepoDetails, [owner, repo]),
        serde_json::to_value(normalize::repository(raw)).ok()?,
      )
    }
    UpdateIssue { owner, repo, number } | CloseIssue { owner, repo, number } => {
      let raw: RawIssue = serde_json::from_value(response.clone()).ok()?;
      (
        ResourceKey::new(
          R::IssueDetail,
          [owner.clone(), repo.clone(), number.to_string()],
        ),
        serde_json::to_value(normalize::issue(raw)).ok()?,
      )
    }
    UpdatePull { owner, repo, number } | MergePull { owner, repo, number } => {
      let raw: RawPull = serde_json::from_value(response.clone()).ok()?;
      (
        ResourceKey::new(
          R::PullDetail,
          [owner.clone(), repo.clone(), number.to_string()],
        ),
        serde_json::to_value(normalize::pull(raw)).ok()?,
      )
    }
    UpdateRelease { owner, repo, release_id } => {
      let raw: RawRelease = serde_json::from_value(response.clone()).ok()?;
      (
        ResourceKey::new(
          R::ReleaseDetail,
          [owner.clone(), repo.clone(), release_id.to_string()],
        ),
        serde_json::to_value(normalize::release(raw)).ok()?,
      )
    }
    _ => return None,
  };

  Some((key, normalized))
}

/// Executes write operations against the gateway.
pub struct Mutations {
  client: GatewayClient,
  store: Arc<CacheStore>,
  notifier: Arc<dyn Notifier>,
}

impl Mutations {
  pub fn new(client: GatewayClient, store: Arc<CacheStore>, notifier: Arc<dyn Notifier>) -> Self {
    Self {
      client,
      store,
      notifier,
    }
  }

  /// Run one mutation. Resolves once the gateway answered and the cache
  /// has been reconciled; callers track pending state by awaiting.
  pub async fn execute(&self, mutation: Mutation) -> Result<Value> {
    let (method, path) = route(&mutation.kind);
    debug!(kind = ?mutation.kind, %method, path, "executing mutation");

    let outcome = if method == Method::POST {
      self.client.post(&path, &mutation.payload).await
    } else if method == Method::PATCH {
      self.client.patch(&path, &mutation.payload).await
    } else if method == Method::PUT {
      self.client.put(&path, &mutation.payload).await
    } else {
      self.client.delete(&path).await
    };

    match outcome {
      Ok(response) => {
        self.apply_success(&mutation.kind, &response);
        Ok(response)
      }
      Err(err) => {
        self.apply_failure(&mutation.kind, &err);
        Err(err)
      }
    }
  }

  /// Post-success cache reconciliation: optimistic merge where possible,
  /// then stale every declared dependent prefix.
  fn apply_success(&self, kind: &MutationKind, response: &Value) {
    if let Some((key, value)) = optimistic_target(kind, response) {
      self.store.set(&key, |entry| {
        entry.data = Some(value);
        entry.status = FetchStatus::Success;
        entry.fetched_at = Some(chrono::Utc::now());
        entry.error = None;
      });
    }

    for prefix in invalidation_targets(kind) {
      self.store.invalidate(&prefix);
    }

    self.notifier.notify_success(success_message(kind));
  }

  fn apply_failure(&self, kind: &MutationKind, err: &ApiError) {
    debug!(kind = ?kind, error = %err, "mutation failed");
    self.notifier.notify_error(&err.message);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::sync::Mutex;

  struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
  }

  impl RecordingNotifier {
    fn new() -> Self {
      Self {
        successes: Mutex::new(Vec::new()),
        errors: Mutex::new(Vec::new()),
      }
    }
  }

  impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
      self.successes.lock().unwrap().push(message.to_string());
    }

    fn notify_error(&self, message: &str) {
      self.errors.lock().unwrap().push(message.to_string());
    }
  }

  fn harness() -> (Arc<CacheStore>, Arc<RecordingNotifier>, Mutations) {
    let store = Arc::new(CacheStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let config = crate::config::Config {
      gateway: crate::config::GatewayConfig {
        url: "https://gw.example.com/api".to_string(),
      },
    };
    // Client construction needs a token; tests never hit the network.
    std::env::set_var("OCTOSYNC_TOKEN", "test-token");
    let client = GatewayClient::new(&config).unwrap();
    let mutations = Mutations::new(client, store.clone(), notifier.clone());
    (store, notifier, mutations)
  }

  fn seed_success(store: &CacheStore, key: &ResourceKey) {
    store.set(key, |e| {
      e.data = Some(json!({"seeded": true}));
      e.status = FetchStatus::Success;
      e.fetched_at = Some(chrono::Utc::now());
    });
  }

  #[test]
  fn test_topics_update_stales_details_but_not_list() {
    let (store, _notifier, mutations) = harness();
    let details = ResourceKey::new(ResourceKind::RepoDetails, ["acme", "widgets"]);
    let list = ResourceKey::new(ResourceKind::Repos, ["1", "20", "updated"]);
    seed_success(&store, &details);
    seed_success(&store, &list);

    mutations.apply_success(
      &MutationKind::UpdateRepoTopics {
        owner: "acme".into(),
        repo: "widgets".into(),
      },
      &json!({"fullName": "acme/widgets", "topics": ["rust"]}),
    );

    assert!(store.get(&details).stale);
    assert!(!store.get(&list).stale);
  }

  #[test]
  fn test_optimistic_merge_updates_detail_entry() {
    let (store, _notifier, mutations) = harness();
    let key = ResourceKey::new(ResourceKind::IssueDetail, ["acme", "widgets", "42"]);
    seed_success(&store, &key);

    mutations.apply_success(
      &MutationKind::UpdateIssue {
        owner: "acme".into(),
        repo: "widgets".into(),
        number: 42,
      },
      &json!({"number": 42, "title": "Renamed title", "state": "open"}),
    );

    let entry = store.get(&key);
    let issue: crate::github::types::Issue = entry.data_as().unwrap();
    assert_eq!(issue.title, "Renamed title");
    // Merged locally, but still staled so the next read fetches the
    // authoritative version.
    assert!(entry.stale);
  }

  #[test]
  fn test_merge_invalidates_branch_list() {
    let (store, _notifier, mutations) = harness();
    let branches = ResourceKey::new(ResourceKind::RepoBranches, ["acme", "widgets"]);
    let collaborators = ResourceKey::new(ResourceKind::RepoCollaborators, ["acme", "widgets"]);
    seed_success(&store, &branches);
    seed_success(&store, &collaborators);

    mutations.apply_success(
      &MutationKind::MergePull {
        owner: "acme".into(),
        repo: "widgets".into(),
        number: 7,
      },
      &json!({"number": 7, "merged": true}),
    );

    assert!(store.get(&branches).stale);
    assert!(!store.get(&collaborators).stale);
  }

  #[test]
  fn test_success_and_failure_reach_the_notifier() {
    let (_store, notifier, mutations) = harness();

    mutations.apply_success(&MutationKind::MarkAllNotificationsRead, &json!(null));
    mutations.apply_failure(
      &MutationKind::CreateRepo,
      &ApiError::from_status(422, "name already exists"),
    );

    assert_eq!(
      notifier.successes.lock().unwrap().as_slice(),
      ["All notifications marked as read"]
    );
    assert_eq!(
      notifier.errors.lock().unwrap().as_slice(),
      ["name already exists"]
    );
  }

  #[test]
  fn test_failure_leaves_cache_untouched() {
    let (store, _notifier, mutations) = harness();
    let details = ResourceKey::new(ResourceKind::RepoDetails, ["acme", "widgets"]);
    seed_success(&store, &details);

    mutations.apply_failure(
      &MutationKind::UpdateRepo {
        owner: "acme".into(),
        repo: "widgets".into(),
      },
      &ApiError::from_status(500, "internal"),
    );

    let entry = store.get(&details);
    assert!(!entry.stale);
    assert_eq!(entry.status, FetchStatus::Success);
  }

  #[test]
  fn test_route_spot_checks() {
    let (method, path) = route(&MutationKind::MergePull {
      owner: "acme".into(),
      repo: "widgets".into(),
      number: 7,
    });
    assert_eq!(method, Method::PUT);
    assert_eq!(path, "/repos/acme/widgets/pulls/7/merge");

    let (method, path) = route(&MutationKind::DeleteBranch {
      owner: "acme".into(),
      repo: "widgets".into(),
      branch: "old-feature".into(),
    });
    assert_eq!(method, Method::DELETE);
    assert_eq!(path, "/repos/acme/widgets/branches/old-feature");

    let (method, path) = route(&MutationKind::MarkAllNotificationsRead);
    assert_eq!(method, Method::PUT);
    assert_eq!(path, "/notifications/read");
  }

  #[test]
  fn test_prefix_shape_of_invalidation_after_create() {
    // Creating an issue stales every cached page of the issue list.
    let (store, _notifier, mutations) = harness();
    let page1 = ResourceKey::new(
      ResourceKind::RepoIssues,
      ["acme", "widgets", "1", "20", "open"],
    );
    let page2 = ResourceKey::new(
      ResourceKind::RepoIssues,
      ["acme", "widgets", "2", "20", "open"],
    );
    seed_success(&store, &page1);
    seed_success(&store, &page2);

    mutations.apply_success(
      &MutationKind::CreateIssue {
        owner: "acme".into(),
        repo: "widgets".into(),
      },
      &json!({"number": 99}),
    );

    assert!(store.get(&page1).stale);
    assert!(store.get(&page2).stale);
  }
}
