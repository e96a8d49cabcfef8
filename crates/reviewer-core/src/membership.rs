use reviewer_types::User;
use tracing::debug;

use crate::errors::StoreResult;
use crate::exclusion::ExclusionSet;
use crate::store::UserStore;

/// Source of eligible candidates for a reviewer decision.
pub struct TeamMembership<'a, S: UserStore + ?Sized> {
    users: &'a S,
}

impl<'a, S: UserStore + ?Sized> TeamMembership<'a, S> {
    pub fn new(users: &'a S) -> Self {
        Self { users }
    }

    /// Active members of `team_name` outside `exclude`, in team order.
    ///
    /// The exclusion set is applied again after the store query, so a
    /// backend that ignores part of it can never leak an excluded id.
    pub async fn eligible_candidates(
        &self,
        team_name: &str,
        exclude: &ExclusionSet,
    ) -> StoreResult<Vec<User>> {
        let members = self.users.list_active_team_members(team_name, exclude).await?;
        let candidates: Vec<User> = members.into_iter().filter(|u| exclude.admits(u)).collect();

        debug!(
            "Team {}: {} eligible candidates ({} excluded ids)",
            team_name,
            candidates.len(),
            exclude.len()
        );
        Ok(candidates)
    }
}
