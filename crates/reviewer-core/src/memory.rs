//! In-memory store.
//!
//! All state is held in memory and lost on restart. Used by tests and by
//! anything that wants the engine without a database.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reviewer_types::{PullRequest, Team, User};
use tokio::sync::RwLock;

use crate::errors::StoreResult;
use crate::exclusion::ExclusionSet;
use crate::store::{PullRequestStore, TeamStore, UserStore};

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    /// Team name to member ids, in insertion order.
    teams: HashMap<String, Vec<String>>,
    pull_requests: HashMap<String, PullRequest>,
    /// Pull request ids in creation order.
    pull_request_order: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(user_id).cloned())
    }

    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &ExclusionSet,
    ) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let Some(member_ids) = state.teams.get(team_name) else {
            return Ok(vec![]);
        };

        Ok(member_ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .filter(|user| exclude.admits(user))
            .cloned()
            .collect())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }
}

#[async_trait]
impl TeamStore for InMemoryStore {
    async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.teams.contains_key(team_name))
    }

    async fn create_team(&self, team: &Team) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.teams.contains_key(&team.team_name) {
            return Ok(false);
        }

        // Member ids are unique across all teams; a clash writes nothing.
        let mut seen = HashSet::new();
        for member in &team.members {
            let clash = state.users.contains_key(&member.user_id)
                || !seen.insert(member.user_id.as_str());
            if clash {
                return Err(anyhow::anyhow!("user {} already exists", member.user_id).into());
            }
        }

        let ids = team.members.iter().map(|m| m.user_id.clone()).collect();
        state.teams.insert(team.team_name.clone(), ids);
        for member in &team.members {
            state.users.insert(member.user_id.clone(), member.clone());
        }
        Ok(true)
    }

    async fn find_team(&self, team_name: &str) -> StoreResult<Option<Team>> {
        let state = self.state.read().await;
        Ok(state.teams.get(team_name).map(|ids| Team {
            team_name: team_name.to_string(),
            members: ids
                .iter()
                .filter_map(|id| state.users.get(id))
                .cloned()
                .collect(),
        }))
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn find_pull_request(&self, pull_request_id: &str) -> StoreResult<Option<PullRequest>> {
        let state = self.state.read().await;
        Ok(state.pull_requests.get(pull_request_id).cloned())
    }

    async fn pull_request_exists(&self, pull_request_id: &str) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.pull_requests.contains_key(pull_request_id))
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> StoreResult<bool> {
        use std::collections::hash_map::Entry;

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        match state.pull_requests.entry(pr.pull_request_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(pr.clone());
                state.pull_request_order.push(pr.pull_request_id.clone());
                Ok(true)
            }
        }
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.pull_requests.get_mut(&pr.pull_request_id) {
            Some(stored) if stored.version == pr.version => {
                *stored = PullRequest {
                    version: pr.version + 1,
                    ..pr.clone()
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_pull_requests_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
        let state = self.state.read().await;
        Ok(state
            .pull_request_order
            .iter()
            .filter_map(|id| state.pull_requests.get(id))
            .filter(|pr| pr.assigned_reviewers.iter().any(|r| r == user_id))
            .cloned()
            .collect())
    }
}
