//! Team bootstrap and team/project binding
//!
//! Creating a team for a project writes three things together (team,
//! owner membership, project binding) and then announces the membership.
//! Events are published only after the writes commit; a publish failure
//! is returned to the caller even though the writes stay committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crewdesk_common::{Error, RepositoryError, Result};
use crewdesk_events::{DomainEvent, EventPublisher};
use uuid::Uuid;

use super::memberships::{membership_conflict, MembershipService};
use super::upstream;
use crate::domain::entities::{Membership, Project, Role, Team};
use crate::domain::validation::parse_id;
use crate::repository::TeamsRepositories;

#[derive(Clone)]
pub struct TeamService {
    repos: TeamsRepositories,
    memberships: MembershipService,
    events: Arc<dyn EventPublisher>,
}

impl TeamService {
    pub fn new(
        repos: TeamsRepositories,
        memberships: MembershipService,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repos,
            memberships,
            events,
        }
    }

    /// Create a team owned by `requester` for an existing project.
    ///
    /// Input is validated and the project loaded before anything is
    /// written. The requester becomes the team's administrator and the
    /// project is bound to the new team.
    pub async fn create_team(
        &self,
        requester: Uuid,
        name: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Team> {
        let team = Team::new(name, requester, now)?;
        let project = self.load_project(project_id).await?;

        let owner = Membership::new(requester, team.id, Role::Administrator, now);
        let team = self
            .repos
            .teams
            .bootstrap(&team, &owner, project.id, now)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => Error::NotFound("Project not found".to_string()),
                other => membership_conflict(other),
            })?;

        tracing::info!(
            team_id = %team.id,
            project_id = %project.id,
            user_id = %requester,
            "Team created for project"
        );

        self.publish(
            DomainEvent::MembershipCreatedForProject {
                membership_id: owner.id,
                team_id: team.id,
                user_id: requester,
                role: owner.role.to_string(),
                project_id: project.id,
                created_at: owner.created_at,
            },
            team.id,
        )
        .await?;

        Ok(team)
    }

    pub async fn retrieve_team(&self, team_id: &str) -> Result<Team> {
        let team_id = parse_id(team_id, "team")?;
        self.get_team(team_id).await
    }

    pub(crate) async fn get_team(&self, team_id: Uuid) -> Result<Team> {
        self.repos
            .teams
            .get_by_id(team_id)
            .await?
            .ok_or_else(|| Error::NotFound("Team not found".to_string()))
    }

    /// Teams `user_id` is a member of
    pub async fn list_teams(&self, user_id: Uuid) -> Result<Vec<Team>> {
        Ok(self.repos.teams.list_by_user(user_id).await?)
    }

    /// Bind an existing project to an existing team, replacing any
    /// previous binding.
    pub async fn assign_existing_team(
        &self,
        caller: Uuid,
        team_id: &str,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Project> {
        let team = self.retrieve_team(team_id).await?;
        let project = self.load_project(project_id).await?;

        let project = self.repos.projects.set_team(project.id, team.id, now).await?;

        tracing::info!(
            team_id = %team.id,
            project_id = %project.id,
            user_id = %caller,
            "Project assigned to team"
        );

        self.publish(
            DomainEvent::ProjectUpdated {
                project_id: project.id,
                team_id: team.id,
                user_id: caller,
                updated_at: now,
            },
            team.id,
        )
        .await?;

        Ok(project)
    }

    /// Remove the caller's own membership and announce it
    pub async fn leave_team(&self, caller: Uuid, team_id: &str) -> Result<Uuid> {
        let membership_id = self
            .memberships
            .delete(team_id, &caller.to_string())
            .await?;

        self.publish(
            DomainEvent::MembershipDeleted {
                membership_id,
                user_id: caller,
            },
            parse_id(team_id, "team")?,
        )
        .await?;

        Ok(membership_id)
    }

    async fn load_project(&self, project_id: &str) -> Result<Project> {
        let project_id = parse_id(project_id, "project")?;
        self.repos
            .projects
            .get_by_id(project_id)
            .await?
            .ok_or_else(|| Error::NotFound("Project not found".to_string()))
    }

    async fn publish(&self, event: DomainEvent, team_id: Uuid) -> Result<()> {
        let name = event.name();
        if let Err(e) = self.events.publish(event).await {
            tracing::error!(
                team_id = %team_id,
                event_name = name,
                error = %e,
                "Writes committed but event not published"
            );
            return Err(upstream("failed to publish event")(e));
        }
        Ok(())
    }
}
