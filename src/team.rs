use tracing::info;

use crate::client::PlatformClient;
use crate::error::{AppError, AppResult};
use crate::models::{Team, TeamResource};

/// Lists the organization's teams once and picks the target by exact name
pub struct TeamLocator<'a, C: PlatformClient + ?Sized> {
    client: &'a C,
    organization: &'a str,
}

impl<'a, C: PlatformClient + ?Sized> TeamLocator<'a, C> {
    pub fn new(client: &'a C, organization: &'a str) -> Self {
        Self {
            client,
            organization,
        }
    }

    pub async fn locate(&self, team_name: &str) -> AppResult<Team> {
        let teams = self.client.list_teams(self.organization).await?;

        let team = find_team(&teams, team_name).ok_or_else(|| AppError::TeamNotFound {
            team: team_name.to_string(),
            organization: self.organization.to_string(),
        })?;

        info!(
            "Located team '{}' ({}): users_count={} visibility={}",
            team.name, team.team_id, team.users_count, team.visibility
        );
        Ok(team)
    }
}

/// Exact, case-sensitive name match
pub fn find_team(teams: &[TeamResource], team_name: &str) -> Option<Team> {
    teams
        .iter()
        .find(|t| t.attributes.name == team_name)
        .map(Team::from)
}
