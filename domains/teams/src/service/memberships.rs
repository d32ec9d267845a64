//! Membership lifecycle
//!
//! Create, look up, list, re-role and delete a user's membership in a
//! team. Identifiers arriving as text are parsed here so malformed input
//! surfaces as `InvalidId` rather than `NotFound`.

use chrono::{DateTime, Utc};
use crewdesk_common::{Error, RepositoryError, Result};
use uuid::Uuid;

use crate::domain::entities::{Membership, MembershipWithUser, Role};
use crate::domain::validation::parse_id;
use crate::repository::TeamsRepositories;

#[derive(Clone)]
pub struct MembershipService {
    repos: TeamsRepositories,
}

impl MembershipService {
    pub fn new(repos: TeamsRepositories) -> Self {
        Self { repos }
    }

    /// Insert a membership. The store's uniqueness rule rejects a second
    /// membership for the same `(team, user)` with `Conflict`.
    pub async fn create(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Membership> {
        let membership = Membership::new(user_id, team_id, role, now);
        let created = self
            .repos
            .memberships
            .create(&membership)
            .await
            .map_err(membership_conflict)?;

        tracing::info!(
            membership_id = %created.id,
            team_id = %team_id,
            user_id = %user_id,
            role = %role,
            "Membership created"
        );
        Ok(created)
    }

    pub async fn retrieve(&self, team_id: &str, user_id: &str) -> Result<Membership> {
        let team_id = parse_id(team_id, "team")?;
        let user_id = parse_id(user_id, "user")?;
        self.get(team_id, user_id).await
    }

    pub(crate) async fn get(&self, team_id: Uuid, user_id: Uuid) -> Result<Membership> {
        self.repos
            .memberships
            .get_by_team_and_user(team_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Membership not found".to_string()))
    }

    /// All members of a team with their profiles. Only members may look;
    /// anyone else gets `NotFound`.
    pub async fn retrieve_enhanced(
        &self,
        caller: Uuid,
        team_id: &str,
    ) -> Result<Vec<MembershipWithUser>> {
        let membership = self.retrieve(team_id, &caller.to_string()).await?;

        let members = self
            .repos
            .memberships
            .list_by_team_with_users(membership.team_id)
            .await?;

        Ok(members)
    }

    /// Change a member's role. `None` keeps the current role and only
    /// refreshes `updated_at`.
    pub async fn update(
        &self,
        team_id: &str,
        role: Option<Role>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Membership> {
        let current = self.retrieve(team_id, user_id).await?;
        let role = role.unwrap_or(current.role);

        let updated = self
            .repos
            .memberships
            .update_role(current.team_id, current.user_id, role, now)
            .await?
            .ok_or_else(|| Error::NotFound("Membership not found".to_string()))?;

        tracing::info!(
            team_id = %updated.team_id,
            user_id = %updated.user_id,
            role = %updated.role,
            "Membership updated"
        );
        Ok(updated)
    }

    /// `update` on behalf of `caller`, who must administer the team
    pub async fn update_as_administrator(
        &self,
        caller: Uuid,
        team_id: &str,
        role: Option<Role>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Membership> {
        let caller_membership = self.retrieve(team_id, &caller.to_string()).await?;
        if caller_membership.role != Role::Administrator {
            return Err(Error::Authorization(
                "Only team administrators can change roles".to_string(),
            ));
        }

        self.update(team_id, role, user_id, now).await
    }

    /// Remove a membership, returning its id
    pub async fn delete(&self, team_id: &str, user_id: &str) -> Result<Uuid> {
        let team_id = parse_id(team_id, "team")?;
        let user_id = parse_id(user_id, "user")?;

        let membership_id = self
            .repos
            .memberships
            .delete(team_id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Membership not found".to_string()))?;

        tracing::info!(
            membership_id = %membership_id,
            team_id = %team_id,
            user_id = %user_id,
            "Membership deleted"
        );
        Ok(membership_id)
    }
}

/// Duplicate memberships read as a conflict with a specific message
pub(crate) fn membership_conflict(err: RepositoryError) -> Error {
    match err {
        RepositoryError::AlreadyExists => {
            Error::Conflict("User is already a member of this team".to_string())
        }
        other => other.into(),
    }
}
