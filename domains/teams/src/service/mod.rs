//! Orchestration services for the Teams domain
//!
//! Services sequence store writes and collaborator calls. Every call is
//! awaited in order; nothing is retried and a failure stops the
//! operation where it happened.

pub mod invites;
pub mod memberships;
pub mod teams;
pub mod token_cache;
pub mod users;

use std::sync::Arc;

use crewdesk_common::Error;
use crewdesk_email::EmailService;
use crewdesk_events::EventPublisher;
use crewdesk_identity::IdentityProvider;

use crate::repository::TeamsRepositories;

pub use invites::InviteService;
pub use memberships::MembershipService;
pub use teams::TeamService;
pub use token_cache::ManagementTokenCache;
pub use users::{Registration, UserService};

/// External systems the services talk to
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityProvider>,
    pub email: Arc<dyn EmailService>,
    pub events: Arc<dyn EventPublisher>,
}

/// All Teams domain services over one set of stores and collaborators
#[derive(Clone)]
pub struct TeamsServices {
    pub memberships: MembershipService,
    pub teams: TeamService,
    pub invites: InviteService,
    pub users: UserService,
}

impl TeamsServices {
    /// `invite_origin` is the link sent to already-registered invitees and
    /// the return URL of password setup links.
    pub fn new(
        repos: TeamsRepositories,
        collaborators: Collaborators,
        invite_origin: impl Into<String>,
    ) -> Self {
        let token_cache = Arc::new(ManagementTokenCache::new(
            repos.tokens.clone(),
            collaborators.identity.clone(),
        ));
        let memberships = MembershipService::new(repos.clone());

        Self {
            teams: TeamService::new(
                repos.clone(),
                memberships.clone(),
                collaborators.events.clone(),
            ),
            users: UserService::new(
                repos.clone(),
                collaborators.identity.clone(),
                token_cache.clone(),
            ),
            invites: InviteService::new(
                repos,
                collaborators,
                token_cache,
                invite_origin.into(),
            ),
            memberships,
        }
    }
}

/// Wrap a collaborator failure as `Error::Upstream` with context
pub(crate) fn upstream<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::Upstream(format!("{}: {}", context, e))
}
