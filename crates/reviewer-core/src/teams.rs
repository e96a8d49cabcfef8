use std::collections::HashSet;

use reviewer_types::{NewTeamMember, Team};
use tracing::info;

use crate::errors::{DomainError, Result, require_id};
use crate::service::ReviewService;

impl ReviewService {
    /// Creates a team together with its members. Member order is kept and
    /// later drives reviewer selection.
    #[tracing::instrument(skip(self, members), fields(members = members.len()))]
    pub async fn create_team(&self, team_name: &str, members: Vec<NewTeamMember>) -> Result<Team> {
        require_id(team_name, "team name")?;

        if self.store.team_exists(team_name).await? {
            return Err(DomainError::TeamExists);
        }

        self.validate_new_members(&members).await?;

        let team = Team {
            team_name: team_name.to_string(),
            members: members.into_iter().map(|m| m.into_user(team_name)).collect(),
        };

        if !self.store.create_team(&team).await? {
            return Err(DomainError::TeamExists);
        }

        info!("Team {} created with {} members", team.team_name, team.members.len());
        Ok(team)
    }

    async fn validate_new_members(&self, members: &[NewTeamMember]) -> Result<()> {
        let mut seen = HashSet::new();
        for member in members {
            require_id(&member.user_id, "user ID")?;
            if !seen.insert(member.user_id.as_str()) {
                return Err(DomainError::validation(format!(
                    "user {} is listed more than once",
                    member.user_id
                )));
            }
            if let Some(existing) = self.store.find_user(&member.user_id).await? {
                return Err(DomainError::validation(format!(
                    "user {} already belongs to team {}",
                    existing.user_id, existing.team_name
                )));
            }
        }
        Ok(())
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team> {
        require_id(team_name, "team name")?;
        self.store
            .find_team(team_name)
            .await?
            .ok_or(DomainError::NotFound("team"))
    }
}
