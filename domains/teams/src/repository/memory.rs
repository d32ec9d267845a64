//! In-memory store for tests and local development
//!
//! One `MemoryStore` implements every store trait over shared tables
//! behind a single mutex, so multi-table writes are all-or-nothing.
//! Rows keep insertion order, which stands in for creation order.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crewdesk_common::RepositoryError;
use crewdesk_identity::ManagementToken;
use uuid::Uuid;

use super::{
    InviteStore, MembershipStore, ProjectStore, StoreResult, TeamStore, TokenStore, UserStore,
};
use crate::domain::entities::{
    Invite, InviteEnhanced, Membership, MembershipWithUser, Project, Role, Team, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    teams: Vec<Team>,
    memberships: Vec<Membership>,
    invites: Vec<Invite>,
    projects: Vec<Project>,
    tokens: Vec<ManagementToken>,
}

impl Tables {
    fn insert_membership(&mut self, membership: &Membership) -> StoreResult<Membership> {
        let duplicate = self.memberships.iter().any(|m| {
            m.id == membership.id
                || (m.team_id == membership.team_id && m.user_id == membership.user_id)
        });
        if duplicate {
            return Err(RepositoryError::AlreadyExists);
        }
        self.memberships.push(membership.clone());
        Ok(membership.clone())
    }

    fn project_mut(&mut self, project_id: Uuid) -> StoreResult<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or(RepositoryError::NotFound)
    }

    fn invite_mut(&mut self, invite: &Invite) -> StoreResult<&mut Invite> {
        self.invites
            .iter_mut()
            .find(|i| i.id == invite.id && i.user_id == invite.user_id)
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::InvalidData("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_identity_id(&self, identity_id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.identity_id == identity_id)
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables()?;
        let duplicate = tables.users.iter().any(|u| {
            u.id == user.id
                || u.email.eq_ignore_ascii_case(&user.email)
                || u.identity_id == user.identity_id
        });
        if duplicate {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let tables = self.tables()?;
        Ok(tables.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Team>> {
        let tables = self.tables()?;
        let teams = tables
            .teams
            .iter()
            .filter(|t| {
                tables
                    .memberships
                    .iter()
                    .any(|m| m.team_id == t.id && m.user_id == user_id)
            })
            .cloned()
            .collect();
        Ok(teams)
    }

    async fn bootstrap(
        &self,
        team: &Team,
        owner: &Membership,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Team> {
        let mut tables = self.tables()?;

        // Check everything before the first write
        if tables.teams.iter().any(|t| t.id == team.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        if !tables.projects.iter().any(|p| p.id == project_id) {
            return Err(RepositoryError::NotFound);
        }

        tables.teams.push(team.clone());
        if let Err(e) = tables.insert_membership(owner) {
            tables.teams.pop();
            return Err(e);
        }
        let project = tables.project_mut(project_id)?;
        project.team_id = Some(team.id);
        project.updated_at = now;

        Ok(team.clone())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn create(&self, membership: &Membership) -> StoreResult<Membership> {
        self.tables()?.insert_membership(membership)
    }

    async fn get_by_team_and_user(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let tables = self.tables()?;
        Ok(tables
            .memberships
            .iter()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_by_team_with_users(
        &self,
        team_id: Uuid,
    ) -> StoreResult<Vec<MembershipWithUser>> {
        let tables = self.tables()?;
        let members = tables
            .memberships
            .iter()
            .filter(|m| m.team_id == team_id)
            .map(|m| {
                let user = tables.users.iter().find(|u| u.id == m.user_id);
                MembershipWithUser::join(m, user)
            })
            .collect();
        Ok(members)
    }

    async fn update_role(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Membership>> {
        let mut tables = self.tables()?;
        let updated = tables
            .memberships
            .iter_mut()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
            .map(|m| {
                m.role = role;
                m.updated_at = now;
                m.clone()
            });
        Ok(updated)
    }

    async fn delete(&self, team_id: Uuid, user_id: Uuid) -> StoreResult<Option<Uuid>> {
        let mut tables = self.tables()?;
        let position = tables
            .memberships
            .iter()
            .position(|m| m.team_id == team_id && m.user_id == user_id);
        Ok(position.map(|index| tables.memberships.remove(index).id))
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn create(&self, invite: &Invite) -> StoreResult<Invite> {
        let mut tables = self.tables()?;
        if tables.invites.iter().any(|i| i.id == invite.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.invites.push(invite.clone());
        Ok(invite.clone())
    }

    async fn get_for_user(&self, user_id: Uuid, invite_id: Uuid) -> StoreResult<Option<Invite>> {
        let tables = self.tables()?;
        Ok(tables
            .invites
            .iter()
            .find(|i| i.id == invite_id && i.user_id == user_id)
            .cloned())
    }

    async fn list_for_user_unexpired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<InviteEnhanced>> {
        let tables = self.tables()?;
        let invites = tables
            .invites
            .iter()
            .filter(|i| i.user_id == user_id && i.expiration > now)
            .filter_map(|i| {
                tables
                    .teams
                    .iter()
                    .find(|t| t.id == i.team_id)
                    .map(|t| InviteEnhanced::join(i, t))
            })
            .collect();
        Ok(invites)
    }

    async fn update(&self, invite: &Invite) -> StoreResult<Invite> {
        let mut tables = self.tables()?;
        let stored = tables.invite_mut(invite)?;
        stored.read = invite.read;
        stored.accepted = invite.accepted;
        stored.updated_at = invite.updated_at;
        Ok(stored.clone())
    }

    async fn accept(
        &self,
        invite: &Invite,
        membership: &Membership,
    ) -> StoreResult<(Invite, Membership)> {
        let mut tables = self.tables()?;

        tables.invite_mut(invite)?;
        let created = tables.insert_membership(membership)?;

        let stored = tables.invite_mut(invite)?;
        stored.read = invite.read;
        stored.accepted = invite.accepted;
        stored.updated_at = invite.updated_at;
        Ok((stored.clone(), created))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables()?;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.tables()?;
        if tables.projects.iter().any(|p| p.id == project.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        tables.projects.push(project.clone());
        Ok(project.clone())
    }

    async fn set_team(
        &self,
        project_id: Uuid,
        team_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Project> {
        let mut tables = self.tables()?;
        let project = tables.project_mut(project_id)?;
        project.team_id = Some(team_id);
        project.updated_at = now;
        Ok(project.clone())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn retrieve(&self) -> StoreResult<Option<ManagementToken>> {
        let tables = self.tables()?;
        Ok(tables.tokens.last().cloned())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.tables()?.tokens.clear();
        Ok(())
    }

    async fn persist(&self, token: &ManagementToken) -> StoreResult<ManagementToken> {
        self.tables()?.tokens.push(token.clone());
        Ok(token.clone())
    }
}
