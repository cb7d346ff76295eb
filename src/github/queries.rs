//! Read contract exposed to UI collaborators.
//!
//! Every read returns a `QuerySnapshot`: data plus loading/error flags,
//! the only read shape the rest of the application may depend on. Reads
//! are cache-first through the fetch executor; passing `FetchMode::Force`
//! is the refetch affordance. Loading transitions are observable through
//! `watch`, which subscribes to the underlying store.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::debounce::DebounceGate;
use crate::cache::fetch::{FetchExecutor, FetchMode};
use crate::cache::key::{ResourceKey, ResourceKind};
use crate::cache::pagination::{PageCursors, PageMeta};
use crate::cache::store::{CacheEntry, FetchStatus, SubscriptionId};
use crate::error::ApiError;

use super::api_types::*;
use super::client::GatewayClient;
use super::normalize;
use super::types::*;

/// Default debounce window for search input.
pub const SEARCH_DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(400);

/// Snapshot of one read's state, handed to UI collaborators.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
  pub data: Option<T>,
  /// First load: fetching with nothing cached to show
  pub is_loading: bool,
  /// Any fetch in flight, including background revalidation
  pub is_fetching: bool,
  pub is_error: bool,
  pub error: Option<ApiError>,
}

fn snapshot<T: DeserializeOwned>(entry: CacheEntry) -> QuerySnapshot<T> {
  let data = entry.data_as::<T>();
  QuerySnapshot {
    is_loading: entry.status == FetchStatus::Loading && entry.data.is_none(),
    is_fetching: entry.status == FetchStatus::Loading,
    is_error: entry.status == FetchStatus::Error,
    error: entry.error,
    data,
  }
}

/// Build a fetcher closure that GETs a raw payload from the gateway, runs
/// it through a normalization adapter, and yields the cacheable value. The
/// closure is a factory so the executor's retry path can call it twice.
fn gateway_fetcher<Raw, T>(
  client: &GatewayClient,
  path: String,
  query: Vec<(&'static str, String)>,
  adapt: fn(Raw) -> T,
) -> impl Fn() -> BoxFuture<'static, crate::error::Result<Value>> + Send + Sync + 'static
where
  Raw: DeserializeOwned + Send + 'static,
  T: Serialize + Send + 'static,
{
  let client = client.clone();
  move || {
    let client = client.clone();
    let path = path.clone();
    let query = query.clone();
    Box::pin(async move {
      let raw: Raw = client.get(&path, &query).await?;
      serde_json::to_value(adapt(raw)).map_err(ApiError::from)
    })
  }
}

/// Typed read operations over the cache and gateway.
pub struct Queries {
  client: GatewayClient,
  executor: Arc<FetchExecutor>,
  cursors: Arc<PageCursors>,
  debounce: DebounceGate,
}

impl Queries {
  pub fn new(
    client: GatewayClient,
    executor: Arc<FetchExecutor>,
    cursors: Arc<PageCursors>,
  ) -> Self {
    Self {
      client,
      executor,
      cursors,
      debounce: DebounceGate::new(SEARCH_DEBOUNCE),
    }
  }

  /// Page cursor manager; UI collaborators drive paging through this.
  pub fn cursors(&self) -> &Arc<PageCursors> {
    &self.cursors
  }

  /// Current state of a key without triggering a fetch.
  pub fn peek<T: DeserializeOwned>(&self, key: &ResourceKey) -> QuerySnapshot<T> {
    snapshot(self.executor.store().get(key))
  }

  /// Observe state changes for a key. The listener fires synchronously on
  /// every write (loading, success, error) until unsubscribed.
  pub fn watch<F>(&self, key: &ResourceKey, listener: F) -> SubscriptionId
  where
    F: Fn(&CacheEntry) + Send + Sync + 'static,
  {
    self.executor.store().subscribe(key, listener)
  }

  pub fn unwatch(&self, key: &ResourceKey, id: SubscriptionId) {
    self.executor.store().unsubscribe(key, id)
  }

  fn record_page_meta(&self, id: &ResourceKey, entry: &CacheEntry) {
    #[derive(serde::Deserialize)]
    struct MetaOnly {
      page: u32,
      per_page: u32,
      has_more: bool,
    }

    if let Some(meta) = entry.data_as::<MetaOnly>() {
      self.cursors.record_meta(
        id,
        PageMeta {
          page: meta.page,
          per_page: meta.per_page,
          has_more: meta.has_more,
        },
      );
    }
  }

  // ==========================================================================
  // Repositories
  // ==========================================================================

  /// List the linked account's repositories, paginated and sorted.
  pub async fn repositories(&self, sort: &str, mode: FetchMode) -> QuerySnapshot<Page<Repository>> {
    let id = ResourceKey::bare(ResourceKind::Repos);
    let cursor = self.cursors.sync_params(&id, sort);
    let key = ResourceKey::new(
      ResourceKind::Repos,
      [cursor.page.to_string(), cursor.per_page.to_string(), sort.to_string()],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      "/repos".to_string(),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
        ("sort", sort.to_string()),
      ],
      normalize::repo_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  pub async fn repository(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Repository> {
    let key = ResourceKey::new(ResourceKind::RepoDetails, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}", owner, repo),
      Vec::new(),
      normalize::repository,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Commits
  // ==========================================================================

  pub async fn commits(
    &self,
    owner: &str,
    repo: &str,
    git_ref: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Page<Commit>> {
    let id = ResourceKey::new(ResourceKind::RepoCommits, [owner, repo]);
    let cursor = self.cursors.sync_params(&id, git_ref);
    let key = ResourceKey::new(
      ResourceKind::RepoCommits,
      [
        owner.to_string(),
        repo.to_string(),
        cursor.page.to_string(),
        cursor.per_page.to_string(),
        git_ref.to_string(),
      ],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/commits", owner, repo),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
        ("ref", git_ref.to_string()),
      ],
      normalize::commit_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  pub async fn commit(
    &self,
    owner: &str,
    repo: &str,
    sha: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<CommitDetail> {
    let key = ResourceKey::new(ResourceKind::CommitDetail, [owner, repo, sha]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/commits/{}", owner, repo, sha),
      Vec::new(),
      normalize::commit_detail,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Branches and tags
  // ==========================================================================

  pub async fn branches(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Vec<Branch>> {
    let key = ResourceKey::new(ResourceKind::RepoBranches, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/branches", owner, repo),
      Vec::new(),
      normalize::branch_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn tags(&self, owner: &str, repo: &str, mode: FetchMode) -> QuerySnapshot<Vec<Tag>> {
    let key = ResourceKey::new(ResourceKind::RepoTags, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/tags", owner, repo),
      Vec::new(),
      normalize::tag_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Issues
  // ==========================================================================

  pub async fn issues(
    &self,
    owner: &str,
    repo: &str,
    state: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Page<Issue>> {
    let id = ResourceKey::new(ResourceKind::RepoIssues, [owner, repo]);
    let cursor = self.cursors.sync_params(&id, state);
    let key = ResourceKey::new(
      ResourceKind::RepoIssues,
      [
        owner.to_string(),
        repo.to_string(),
        cursor.page.to_string(),
        cursor.per_page.to_string(),
        state.to_string(),
      ],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/issues", owner, repo),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
        ("state", state.to_string()),
      ],
      normalize::issue_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  pub async fn issue(
    &self,
    owner: &str,
    repo: &str,
    number: u64,
    mode: FetchMode,
  ) -> QuerySnapshot<Issue> {
    let key = ResourceKey::new(
      ResourceKind::IssueDetail,
      [owner.to_string(), repo.to_string(), number.to_string()],
    );
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/issues/{}", owner, repo, number),
      Vec::new(),
      normalize::issue,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn issue_comments(
    &self,
    owner: &str,
    repo: &str,
    number: u64,
    mode: FetchMode,
  ) -> QuerySnapshot<Page<Comment>> {
    let id = ResourceKey::new(
      ResourceKind::IssueComments,
      [owner.to_string(), repo.to_string(), number.to_string()],
    );
    let cursor = self.cursors.sync_params(&id, "");
    let key = ResourceKey::new(
      ResourceKind::IssueComments,
      [
        owner.to_string(),
        repo.to_string(),
        number.to_string(),
        cursor.page.to_string(),
        cursor.per_page.to_string(),
      ],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/issues/{}/comments", owner, repo, number),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
      ],
      normalize::comment_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  // ==========================================================================
  // Pull requests
  // ==========================================================================

  pub async fn pulls(
    &self,
    owner: &str,
    repo: &str,
    state: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Page<PullRequest>> {
    let id = ResourceKey::new(ResourceKind::RepoPulls, [owner, repo]);
    let cursor = self.cursors.sync_params(&id, state);
    let key = ResourceKey::new(
      ResourceKind::RepoPulls,
      [
        owner.to_string(),
        repo.to_string(),
        cursor.page.to_string(),
        cursor.per_page.to_string(),
        state.to_string(),
      ],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/pulls", owner, repo),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
        ("state", state.to_string()),
      ],
      normalize::pull_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  pub async fn pull(
    &self,
    owner: &str,
    repo: &str,
    number: u64,
    mode: FetchMode,
  ) -> QuerySnapshot<PullRequest> {
    let key = ResourceKey::new(
      ResourceKind::PullDetail,
      [owner.to_string(), repo.to_string(), number.to_string()],
    );
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/pulls/{}", owner, repo, number),
      Vec::new(),
      normalize::pull,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn pull_files(
    &self,
    owner: &str,
    repo: &str,
    number: u64,
    mode: FetchMode,
  ) -> QuerySnapshot<Vec<PullFile>> {
    let key = ResourceKey::new(
      ResourceKind::PullFiles,
      [owner.to_string(), repo.to_string(), number.to_string()],
    );
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/pulls/{}/files", owner, repo, number),
      Vec::new(),
      normalize::pull_file_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Releases
  // ==========================================================================

  pub async fn releases(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Page<Release>> {
    let id = ResourceKey::new(ResourceKind::RepoReleases, [owner, repo]);
    let cursor = self.cursors.sync_params(&id, "");
    let key = ResourceKey::new(
      ResourceKind::RepoReleases,
      [
        owner.to_string(),
        repo.to_string(),
        cursor.page.to_string(),
        cursor.per_page.to_string(),
      ],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/releases", owner, repo),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
      ],
      normalize::release_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  pub async fn release(
    &self,
    owner: &str,
    repo: &str,
    release_id: u64,
    mode: FetchMode,
  ) -> QuerySnapshot<Release> {
    let key = ResourceKey::new(
      ResourceKind::ReleaseDetail,
      [owner.to_string(), repo.to_string(), release_id.to_string()],
    );
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/releases/{}", owner, repo, release_id),
      Vec::new(),
      normalize::release,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Repository metadata
  // ==========================================================================

  pub async fn collaborators(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Vec<Collaborator>> {
    let key = ResourceKey::new(ResourceKind::RepoCollaborators, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/collaborators", owner, repo),
      Vec::new(),
      normalize::collaborator_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn labels(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Vec<Label>> {
    let key = ResourceKey::new(ResourceKind::RepoLabels, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/labels", owner, repo),
      Vec::new(),
      normalize::label_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn milestones(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Vec<Milestone>> {
    let key = ResourceKey::new(ResourceKind::RepoMilestones, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/milestones", owner, repo),
      Vec::new(),
      normalize::milestone_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn contributors(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Vec<Contributor>> {
    let key = ResourceKey::new(ResourceKind::RepoContributors, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/contributors", owner, repo),
      Vec::new(),
      normalize::contributor_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn languages(
    &self,
    owner: &str,
    repo: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<Languages> {
    let key = ResourceKey::new(ResourceKind::RepoLanguages, [owner, repo]);
    // Languages arrive as a plain name-to-bytes map; identity adapter.
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/languages", owner, repo),
      Vec::new(),
      std::convert::identity::<Languages>,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn readme(&self, owner: &str, repo: &str, mode: FetchMode) -> QuerySnapshot<Readme> {
    let key = ResourceKey::new(ResourceKind::RepoReadme, [owner, repo]);
    let fetcher = gateway_fetcher(
      &self.client,
      format!("/repos/{}/{}/readme", owner, repo),
      Vec::new(),
      normalize::readme,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Notifications and account
  // ==========================================================================

  pub async fn notifications(
    &self,
    include_read: bool,
    mode: FetchMode,
  ) -> QuerySnapshot<Page<Notification>> {
    let id = ResourceKey::bare(ResourceKind::Notifications);
    let cursor = self.cursors.sync_params(&id, if include_read { "all" } else { "unread" });
    let key = ResourceKey::new(
      ResourceKind::Notifications,
      [
        cursor.page.to_string(),
        cursor.per_page.to_string(),
        include_read.to_string(),
      ],
    );

    let fetcher = gateway_fetcher(
      &self.client,
      "/notifications".to_string(),
      vec![
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
        ("all", include_read.to_string()),
      ],
      normalize::notification_page,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }

  /// Profile of the linked account.
  pub async fn user_profile(&self, mode: FetchMode) -> QuerySnapshot<UserProfile> {
    let key = ResourceKey::bare(ResourceKind::UserProfile);
    let fetcher = gateway_fetcher(
      &self.client,
      "/user".to_string(),
      Vec::new(),
      normalize::user_profile,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  pub async fn user_orgs(&self, mode: FetchMode) -> QuerySnapshot<Vec<Org>> {
    let key = ResourceKey::bare(ResourceKind::UserOrgs);
    let fetcher = gateway_fetcher(
      &self.client,
      "/user/orgs".to_string(),
      Vec::new(),
      normalize::org_list,
    );
    snapshot(self.executor.run(mode, &key, fetcher).await)
  }

  // ==========================================================================
  // Search (debounced)
  // ==========================================================================

  /// Debounced repository search. The raw input goes through the debounce
  /// gate; a value superseded within the window never reaches the network,
  /// and the snapshot of the input's key is returned as-is.
  pub async fn search_repositories(
    &self,
    input: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<SearchPage<Repository>> {
    self
      .search(ResourceKind::SearchRepos, "/search/repos", input, mode, normalize::repo_search_page)
      .await
  }

  pub async fn search_issues(
    &self,
    input: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<SearchPage<Issue>> {
    self
      .search(ResourceKind::SearchIssues, "/search/issues", input, mode, normalize::issue_search_page)
      .await
  }

  pub async fn search_users(
    &self,
    input: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<SearchPage<Owner>> {
    self
      .search(ResourceKind::SearchUsers, "/search/users", input, mode, normalize::user_search_page)
      .await
  }

  pub async fn search_code(
    &self,
    input: &str,
    mode: FetchMode,
  ) -> QuerySnapshot<SearchPage<CodeHit>> {
    self
      .search(ResourceKind::SearchCode, "/search/code", input, mode, normalize::code_search_page)
      .await
  }

  async fn search<Raw, T>(
    &self,
    kind: ResourceKind,
    path: &str,
    input: &str,
    mode: FetchMode,
    adapt: fn(Raw) -> T,
  ) -> QuerySnapshot<T>
  where
    Raw: DeserializeOwned + Send + 'static,
    T: Serialize + DeserializeOwned + Send + 'static,
  {
    let id = ResourceKey::bare(kind);
    let cursor = self.cursors.sync_params(&id, input);
    let key = ResourceKey::new(
      kind,
      [
        input.to_string(),
        cursor.page.to_string(),
        cursor.per_page.to_string(),
      ],
    );

    // Wait out the debounce window; a superseded input never fetches.
    let Some(query_text) = self.debounce.debounce(input.to_string()).await else {
      return snapshot(self.executor.store().get(&key));
    };

    let fetcher = gateway_fetcher(
      &self.client,
      path.to_string(),
      vec![
        ("q", query_text),
        ("page", cursor.page.to_string()),
        ("perPage", cursor.per_page.to_string()),
      ],
      adapt,
    );
    let entry = self.executor.run(mode, &key, fetcher).await;
    self.record_page_meta(&id, &entry);
    snapshot(entry)
  }
}
