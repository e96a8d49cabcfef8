use std::sync::Arc;

use async_trait::async_trait;
use reviewer_core::store::{PullRequestStore, TeamStore, UserStore};
use reviewer_core::{ExclusionSet, StoreResult};
use reviewer_types::{PullRequest, Team, User};
use tracing::error;

use crate::Database;
use crate::models::{PullRequestRow, UserRow};

/// Store backed by SQLite. Every call runs on the blocking pool so the
/// async runtime never waits on the connection lock.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                anyhow::anyhow!("database task failed: {}", e)
            })?;
        Ok(result?)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        let user_id = user_id.to_string();
        self.blocking(move |db| Ok(db.get_user(&user_id)?.map(User::from)))
            .await
    }

    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &ExclusionSet,
    ) -> StoreResult<Vec<User>> {
        let team_name = team_name.to_string();
        let exclude: Vec<String> = exclude.iter().map(str::to_string).collect();
        self.blocking(move |db| {
            let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();
            let rows = db.get_active_team_members(&team_name, &exclude)?;
            Ok(rows.into_iter().map(User::from).collect())
        })
        .await
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> StoreResult<Option<User>> {
        let user_id = user_id.to_string();
        self.blocking(move |db| Ok(db.set_user_active(&user_id, is_active)?.map(User::from)))
            .await
    }
}

#[async_trait]
impl TeamStore for SqliteStore {
    async fn team_exists(&self, team_name: &str) -> StoreResult<bool> {
        let team_name = team_name.to_string();
        self.blocking(move |db| db.team_exists(&team_name)).await
    }

    async fn create_team(&self, team: &Team) -> StoreResult<bool> {
        let team_name = team.team_name.clone();
        let members: Vec<UserRow> = team
            .members
            .iter()
            .enumerate()
            .map(|(position, user)| UserRow {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
                team_name: team_name.clone(),
                is_active: user.is_active,
                position: position as i64,
            })
            .collect();
        self.blocking(move |db| db.insert_team(&team_name, &members)).await
    }

    async fn find_team(&self, team_name: &str) -> StoreResult<Option<Team>> {
        let team_name = team_name.to_string();
        self.blocking(move |db| {
            Ok(db.get_team_members(&team_name)?.map(|rows| Team {
                team_name,
                members: rows.into_iter().map(User::from).collect(),
            }))
        })
        .await
    }
}

#[async_trait]
impl PullRequestStore for SqliteStore {
    async fn find_pull_request(&self, pull_request_id: &str) -> StoreResult<Option<PullRequest>> {
        let id = pull_request_id.to_string();
        self.blocking(move |db| db.get_pull_request(&id)?.map(PullRequest::try_from).transpose())
            .await
    }

    async fn pull_request_exists(&self, pull_request_id: &str) -> StoreResult<bool> {
        let id = pull_request_id.to_string();
        self.blocking(move |db| db.pull_request_exists(&id)).await
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> StoreResult<bool> {
        let row = PullRequestRow::from_domain(pr)?;
        self.blocking(move |db| db.insert_pull_request(&row)).await
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> StoreResult<bool> {
        let row = PullRequestRow::from_domain(pr)?;
        self.blocking(move |db| db.update_pull_request(&row)).await
    }

    async fn list_pull_requests_by_reviewer(&self, user_id: &str) -> StoreResult<Vec<PullRequest>> {
        let user_id = user_id.to_string();
        self.blocking(move |db| {
            db.get_pull_requests_by_reviewer(&user_id)?
                .into_iter()
                .map(PullRequest::try_from)
                .collect()
        })
        .await
    }
}
