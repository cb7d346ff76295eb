//! Invalidation engine: the static table of cache dependencies.
//!
//! Every mutation kind declares, in one place, which key prefixes become
//! stale when it succeeds. Centralizing this (instead of sprinkling
//! invalidation calls through each mutation's success path) keeps the
//! dependency graph reviewable and testable as a unit. The table is
//! exhaustive and every row is non-empty: a mutation with no observable
//! invalidation means stale UI after a write.

use super::key::{KeyPrefix, ResourceKind};

/// Every write operation the layer can relay to the gateway.
///
/// Variants carry the parameters needed to build concrete invalidation
/// prefixes and request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
  CreateRepo,
  UpdateRepo { owner: String, repo: String },
  DeleteRepo { owner: String, repo: String },
  UpdateRepoTopics { owner: String, repo: String },
  CreateIssue { owner: String, repo: String },
  UpdateIssue { owner: String, repo: String, number: u64 },
  CloseIssue { owner: String, repo: String, number: u64 },
  CreateIssueComment { owner: String, repo: String, number: u64 },
  CreatePull { owner: String, repo: String },
  UpdatePull { owner: String, repo: String, number: u64 },
  MergePull { owner: String, repo: String, number: u64 },
  CreateBranch { owner: String, repo: String },
  DeleteBranch { owner: String, repo: String, branch: String },
  CreateRelease { owner: String, repo: String },
  UpdateRelease { owner: String, repo: String, release_id: u64 },
  DeleteRelease { owner: String, repo: String, release_id: u64 },
  AddCollaborator { owner: String, repo: String, username: String },
  RemoveCollaborator { owner: String, repo: String, username: String },
  CreateLabel { owner: String, repo: String },
  UpdateLabel { owner: String, repo: String, name: String },
  DeleteLabel { owner: String, repo: String, name: String },
  CreateMilestone { owner: String, repo: String },
  MarkNotificationRead { thread_id: String },
  MarkAllNotificationsRead,
}

/// The dependency table: which prefixes a successful mutation stales.
pub fn invalidation_targets(kind: &MutationKind) -> Vec<KeyPrefix> {
  use MutationKind::*;
  use ResourceKind as R;

  match kind {
    CreateRepo => vec![KeyPrefix::bare(R::Repos)],
    UpdateRepo { owner, repo } | DeleteRepo { owner, repo } => vec![
      KeyPrefix::bare(R::Repos),
      KeyPrefix::new(R::RepoDetails, [owner, repo]),
    ],
    // Topics are embedded in the repository details only.
    UpdateRepoTopics { owner, repo } => {
      vec![KeyPrefix::new(R::RepoDetails, [owner, repo])]
    }
    CreateIssue { owner, repo } => vec![KeyPrefix::new(R::RepoIssues, [owner, repo])],
    UpdateIssue { owner, repo, number } | CloseIssue { owner, repo, number } => vec![
      KeyPrefix::new(R::RepoIssues, [owner, repo]),
      KeyPrefix::new(R::IssueDetail, [owner.clone(), repo.clone(), number.to_string()]),
    ],
    // Comment counts are embedded in the issue detail.
    CreateIssueComment { owner, repo, number } => vec![
      KeyPrefix::new(
        R::IssueComments,
        [owner.clone(), repo.clone(), number.to_string()],
      ),
      KeyPrefix::new(R::IssueDetail, [owner.clone(), repo.clone(), number.to_string()]),
    ],
    CreatePull { owner, repo } => vec![KeyPrefix::new(R::RepoPulls, [owner, repo])],
    // A merge can delete or advance branches, so the branch list goes too.
    UpdatePull { owner, repo, number } | MergePull { owner, repo, number } => vec![
      KeyPrefix::new(R::RepoPulls, [owner, repo]),
      KeyPrefix::new(R::PullDetail, [owner.clone(), repo.clone(), number.to_string()]),
      KeyPrefix::new(R::RepoBranches, [owner, repo]),
    ],
    CreateBranch { owner, repo } | DeleteBranch { owner, repo, .. } => {
      vec![KeyPrefix::new(R::RepoBranches, [owner, repo])]
    }
    // Releases create tags as a side effect.
    CreateRelease { owner, repo } => vec![
      KeyPrefix::new(R::RepoReleases, [owner, repo]),
      KeyPrefix::new(R::RepoTags, [owner, repo]),
    ],
    UpdateRelease { owner, repo, release_id } => vec![
      KeyPrefix::new(R::RepoReleases, [owner, repo]),
      KeyPrefix::new(
        R::ReleaseDetail,
        [owner.clone(), repo.clone(), release_id.to_string()],
      ),
    ],
    DeleteRelease { owner, repo, release_id } => vec![
      KeyPrefix::new(R::RepoReleases, [owner, repo]),
      KeyPrefix::new(
        R::ReleaseDetail,
        [owner.clone(), repo.clone(), release_id.to_string()],
      ),
    ],
    AddCollaborator { owner, repo, .. } | RemoveCollaborator { owner, repo, .. } => {
      vec![KeyPrefix::new(R::RepoCollaborators, [owner, repo])]
    }
    CreateLabel { owner, repo }
    | UpdateLabel { owner, repo, .. }
    | DeleteLabel { owner, repo, .. } => {
      vec![KeyPrefix::new(R::RepoLabels, [owner, repo])]
    }
    CreateMilestone { owner, repo } => {
      vec![KeyPrefix::new(R::RepoMilestones, [owner, repo])]
    }
    MarkNotificationRead { .. } | MarkAllNotificationsRead => {
      vec![KeyPrefix::bare(R::Notifications)]
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn all_kinds() -> Vec<MutationKind> {
    use MutationKind::*;
    let o = "acme".to_string();
    let r = "widgets".to_string();
    vec![
      CreateRepo,
      UpdateRepo { owner: o.clone(), repo: r.clone() },
      DeleteRepo { owner: o.clone(), repo: r.clone() },
      UpdateRepoTopics { owner: o.clone(), repo: r.clone() },
      CreateIssue { owner: o.clone(), repo: r.clone() },
      UpdateIssue { owner: o.clone(), repo: r.clone(), number: 1 },
      CloseIssue { owner: o.clone(), repo: r.clone(), number: 1 },
      CreateIssueComment { owner: o.clone(), repo: r.clone(), number: 1 },
      CreatePull { owner: o.clone(), repo: r.clone() },
      UpdatePull { owner: o.clone(), repo: r.clone(), number: 2 },
      MergePull { owner: o.clone(), repo: r.clone(), number: 2 },
      CreateBranch { owner: o.clone(), repo: r.clone() },
      DeleteBranch { owner: o.clone(), repo: r.clone(), branch: "dev".into() },
      CreateRelease { owner: o.clone(), repo: r.clone() },
      UpdateRelease { owner: o.clone(), repo: r.clone(), release_id: 9 },
      DeleteRelease { owner: o.clone(), repo: r.clone(), release_id: 9 },
      AddCollaborator { owner: o.clone(), repo: r.clone(), username: "mona".into() },
      RemoveCollaborator { owner: o.clone(), repo: r.clone(), username: "mona".into() },
      CreateLabel { owner: o.clone(), repo: r.clone() },
      UpdateLabel { owner: o.clone(), repo: r.clone(), name: "bug".into() },
      DeleteLabel { owner: o.clone(), repo: r.clone(), name: "bug".into() },
      CreateMilestone { owner: o.clone(), repo: r.clone() },
      MarkNotificationRead { thread_id: "t1".into() },
      MarkAllNotificationsRead,
    ]
  }

  #[test]
  fn test_every_mutation_kind_invalidates_something() {
    for kind in all_kinds() {
      assert!(
        !invalidation_targets(&kind).is_empty(),
        "empty invalidation set for {:?}",
        kind
      );
    }
  }

  #[test]
  fn test_topics_update_stales_details_only() {
    let targets = invalidation_targets(&MutationKind::UpdateRepoTopics {
      owner: "acme".into(),
      repo: "widgets".into(),
    });

    assert_eq!(
      targets,
      vec![KeyPrefix::new(ResourceKind::RepoDetails, ["acme", "widgets"])]
    );
  }

  #[test]
  fn test_merge_stales_pulls_detail_and_branches() {
    let targets = invalidation_targets(&MutationKind::MergePull {
      owner: "acme".into(),
      repo: "widgets".into(),
      number: 7,
    });

    assert!(targets.contains(&KeyPrefix::new(ResourceKind::RepoPulls, ["acme", "widgets"])));
    assert!(targets.contains(&KeyPrefix::new(
      ResourceKind::PullDetail,
      ["acme", "widgets", "7"]
    )));
    assert!(targets.contains(&KeyPrefix::new(
      ResourceKind::RepoBranches,
      ["acme", "widgets"]
    )));
  }

  #[test]
  fn test_collaborator_changes_stale_collaborator_list_only() {
    let targets = invalidation_targets(&MutationKind::RemoveCollaborator {
      owner: "acme".into(),
      repo: "widgets".into(),
      username: "mona".into(),
    });

    assert_eq!(
      targets,
      vec![KeyPrefix::new(
        ResourceKind::RepoCollaborators,
        ["acme", "widgets"]
      )]
    );
  }
}
