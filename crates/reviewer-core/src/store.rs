//! Storage capabilities consumed by the engine.
//!
//! Implementations provide the actual backend (in-memory, SQLite). The
//! engine never holds state of its own between calls, so every decision is
//! made on data read through these traits immediately before use.

use async_trait::async_trait;
use reviewer_types::{PullRequest, Team, User};

use crate::errors::StoreResult;
use crate::exclusion::ExclusionSet;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// Active members of `team_name` not in `exclude`, in team insertion order.
    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &ExclusionSet,
    ) -> StoreResult<Vec<User>>;

    /// Returns the updated user, or `None` if the id is unknown.
    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn team_exists(&self, team_name: &str) -> StoreResult<bool>;

    /// Inserts the team and all its members at once.
    ///
    /// Returns `false` without writing anything if the team name is taken.
    async fn create_team(&self, team: &Team) -> StoreResult<bool>;

    async fn find_team(&self, team_name: &str) -> StoreResult<Option<Team>>;
}

#[async_trait]
pub trait PullRequestStore: Send + Sync {
    async fn find_pull_request(&self, pull_request_id: &str) -> StoreResult<Option<PullRequest>>;

    async fn pull_request_exists(&self, pull_request_id: &str) -> StoreResult<bool>;

    /// Insert-if-absent. Returns `false` if the id is already in use.
    async fn create_pull_request(&self, pr: &PullRequest) -> StoreResult<bool>;

    /// Full replacement of the stored row, guarded by `pr.version`.
    ///
    /// Writes only if the stored version still equals `pr.version`, and bumps
    /// it by one. Returns `false` when the row changed since it was read.
    async fn update_pull_request(&self, pr: &PullRequest) -> StoreResult<bool>;

    /// Every pull request listing `user_id` as a reviewer, oldest first.
    async fn list_pull_requests_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>>;
}

/// Everything the service needs from a backend.
pub trait Store: UserStore + TeamStore + PullRequestStore {}

impl<T: ?Sized> Store for T where T: UserStore + TeamStore + PullRequestStore {}
