//! Store traits and implementations for the Teams domain
//!
//! One async trait per entity. Each has a Postgres implementation using
//! runtime `sqlx::query_as` against a `PgPool`, and all of them are
//! implemented by `MemoryStore` for tests and local development.
//! Writes that must land together (team bootstrap, invite acceptance)
//! are single store calls backed by one database transaction.

pub mod invites;
pub mod memberships;
pub mod memory;
pub mod projects;
pub mod teams;
pub mod tokens;
pub mod transactions;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crewdesk_common::RepositoryError;
use crewdesk_identity::ManagementToken;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    Invite, InviteEnhanced, Membership, MembershipWithUser, Project, Role, Team, User,
};

pub use invites::InviteRepository;
pub use memberships::MembershipRepository;
pub use memory::MemoryStore;
pub use projects::ProjectRepository;
pub use teams::TeamRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

pub type StoreResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive on the address
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_by_identity_id(&self, identity_id: &str) -> StoreResult<Option<User>>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn create(&self, user: &User) -> StoreResult<User>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Team>>;

    /// Teams the user holds a membership in, oldest first
    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Team>>;

    /// Insert the team and its owner membership and bind the project to
    /// the team, all or nothing. `NotFound` if the project is gone.
    async fn bootstrap(
        &self,
        team: &Team,
        owner: &Membership,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Team>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// `AlreadyExists` when the user is already a member of the team
    async fn create(&self, membership: &Membership) -> StoreResult<Membership>;

    async fn get_by_team_and_user(
        &self,
        team_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>>;

    /// Members of a team joined with their profiles, in creation order
    async fn list_by_team_with_users(&self, team_id: Uuid)
        -> StoreResult<Vec<MembershipWithUser>>;

    async fn update_role(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        role: Role,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Membership>>;

    /// Id of the deleted membership, `None` if there was none
    async fn delete(&self, team_id: Uuid, user_id: Uuid) -> StoreResult<Option<Uuid>>;
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    async fn create(&self, invite: &Invite) -> StoreResult<Invite>;

    /// Invite addressed to `user_id`; other users' invites are invisible
    async fn get_for_user(&self, user_id: Uuid, invite_id: Uuid) -> StoreResult<Option<Invite>>;

    /// Invites with `expiration > now`, joined with team names, oldest first
    async fn list_for_user_unexpired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<InviteEnhanced>>;

    /// Persist `read`, `accepted` and `updated_at`
    async fn update(&self, invite: &Invite) -> StoreResult<Invite>;

    /// Persist the accepted invite and insert the resulting membership,
    /// all or nothing
    async fn accept(
        &self,
        invite: &Invite,
        membership: &Membership,
    ) -> StoreResult<(Invite, Membership)>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Project>>;

    async fn create(&self, project: &Project) -> StoreResult<Project>;

    /// Overwrite the project's team binding. `NotFound` if absent.
    async fn set_team(&self, project_id: Uuid, team_id: Uuid, now: DateTime<Utc>)
        -> StoreResult<Project>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn retrieve(&self) -> StoreResult<Option<ManagementToken>>;

    async fn delete_all(&self) -> StoreResult<()>;

    async fn persist(&self, token: &ManagementToken) -> StoreResult<ManagementToken>;
}

/// Combined store access for the Teams domain
#[derive(Clone)]
pub struct TeamsRepositories {
    pub users: Arc<dyn UserStore>,
    pub teams: Arc<dyn TeamStore>,
    pub memberships: Arc<dyn MembershipStore>,
    pub invites: Arc<dyn InviteStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl TeamsRepositories {
    #[mutants::skip] // Wiring only, needs a live database
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            teams: Arc::new(TeamRepository::new(pool.clone())),
            memberships: Arc::new(MembershipRepository::new(pool.clone())),
            invites: Arc::new(InviteRepository::new(pool.clone())),
            projects: Arc::new(ProjectRepository::new(pool.clone())),
            tokens: Arc::new(TokenRepository::new(pool)),
        }
    }

    /// Every store backed by one shared `MemoryStore`
    pub fn in_memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            teams: Arc::new(store.clone()),
            memberships: Arc::new(store.clone()),
            invites: Arc::new(store.clone()),
            projects: Arc::new(store.clone()),
            tokens: Arc::new(store),
        }
    }
}
