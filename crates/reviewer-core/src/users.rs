use reviewer_types::{PullRequest, User};
use tracing::info;

use crate::errors::{DomainError, Result, require_id};
use crate::service::ReviewService;

const HEALTH_PROBE_TEAM: &str = "health_check_probe";

impl ReviewService {
    /// Toggles eligibility. Existing assignments are left as they are.
    #[tracing::instrument(skip(self))]
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        require_id(user_id, "user ID")?;

        let user = self
            .store
            .set_user_active(user_id, is_active)
            .await?
            .ok_or(DomainError::NotFound("user"))?;

        info!("User {} is_active set to {}", user.user_id, user.is_active);
        Ok(user)
    }

    /// Pull requests the user is assigned to review, oldest first.
    pub async fn get_user_reviews(&self, user_id: &str) -> Result<Vec<PullRequest>> {
        require_id(user_id, "user ID")?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(DomainError::NotFound("user"));
        }
        Ok(self.store.list_pull_requests_by_reviewer(user_id).await?)
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.team_exists(HEALTH_PROBE_TEAM).await?;
        Ok(())
    }
}
