//! Shared fixtures for engine tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use reviewer_types::{NewTeamMember, PullRequest, PullRequestDraft, Team, User};

use crate::errors::StoreResult;
use crate::exclusion::ExclusionSet;
use crate::memory::InMemoryStore;
use crate::service::ReviewService;
use crate::store::{PullRequestStore, TeamStore, UserStore};

pub(crate) fn members(roster: &[(&str, bool)]) -> Vec<NewTeamMember> {
    roster
        .iter()
        .map(|(id, active)| NewTeamMember {
            user_id: id.to_string(),
            username: format!("User {}", id),
            is_active: *active,
        })
        .collect()
}

pub(crate) fn draft(id: &str, author_id: &str) -> PullRequestDraft {
    PullRequestDraft {
        pull_request_id: id.to_string(),
        pull_request_name: format!("Change {}", id),
        author_id: author_id.to_string(),
    }
}

pub(crate) async fn service_with_team(
    team_name: &str,
    roster: &[(&str, bool)],
) -> ReviewService {
    let svc = ReviewService::new(Arc::new(InMemoryStore::new()));
    svc.create_team(team_name, members(roster)).await.unwrap();
    svc
}

/// Wraps a store and lands a competing write right before each of the next
/// `remaining` pull request updates, so those updates see a stale version.
///
/// The competing write swaps reviewer `b` for `d` when `b` is assigned.
pub(crate) struct InterferingStore {
    inner: Arc<InMemoryStore>,
    remaining: AtomicU32,
}

impl InterferingStore {
    pub(crate) fn new(inner: Arc<InMemoryStore>, interferences: u32) -> Self {
        Self {
            inner,
            remaining: AtomicU32::new(interferences),
        }
    }

    async fn competing_write(&self, pull_request_id: &str) -> StoreResult<()> {
        if let Some(mut current) = self.inner.find_pull_request(pull_request_id).await? {
            if let Some(slot) = current.reviewer_position("b") {
                current.assigned_reviewers[slot] = "d".to_string();
            }
            self.inner.update_pull_request(&current).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InterferingStore {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user(user_id).await
    }

    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &ExclusionSet,
    ) -> StoreResult<Vec<User>> {
        self.inner.list_active_team_members(team_name, exclude).await
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<Option<User>> {
        self.inner.set_user_active(user_id, is_active).await
    }
}

#[async_trait]
impl TeamStore for InterferingStore {
    async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
        self.inner.team_exists(team_name).await
    }

    async fn create_team(&self, team: &Team) -> StoreResult<bool> {
        self.inner.create_team(team).await
    }

    async fn find_team(&self, team_name: &str) -> StoreResult<Option<Team>> {
        self.inner.find_team(team_name).await
    }
}

#[async_trait]
impl PullRequestStore for InterferingStore {
    async fn find_pull_request(&self, pull_request_id: &str) -> StoreResult<Option<PullRequest>> {
        self.inner.find_pull_request(pull_request_id).await
    }

    async fn pull_request_exists(&self, pull_request_id: &str) -> StoreResult<bool> {
        self.inner.pull_request_exists(pull_request_id).await
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> StoreResult<bool> {
        self.inner.create_pull_request(pr).await
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> StoreResult<bool> {
        let interfere = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if interfere {
            self.competing_write(&pr.pull_request_id).await?;
        }
        self.inner.update_pull_request(pr).await
    }

    async fn list_pull_requests_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
        self.inner.list_pull_requests_by_reviewer(user_id).await
    }
}
